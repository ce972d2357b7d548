//! Company record input port.

use crate::domain::company::Company;
use crate::domain::error::EsgError;

pub trait CompanySource {
    /// Every company record in source order.
    fn load_companies(&self) -> Result<Vec<Company>, EsgError>;
}
