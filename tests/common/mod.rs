#![allow(dead_code)]

use chrono::NaiveDate;
use esgscore::domain::company::Company;
use esgscore::domain::error::EsgError;
use esgscore::domain::esg::EsgSubject;
use esgscore::domain::instrument::{AssetClass, Instrument, InstrumentType};
use esgscore::domain::store::EntityStore;
use esgscore::ports::company_source::CompanySource;
use esgscore::ports::universe_source::UniverseSource;
use std::io::Write;

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn write_temp(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub struct MockCompanySource {
    pub companies: Vec<Company>,
    pub error: Option<String>,
}

impl MockCompanySource {
    pub fn new(companies: Vec<Company>) -> Self {
        Self {
            companies,
            error: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            companies: Vec::new(),
            error: Some(reason.to_string()),
        }
    }
}

impl CompanySource for MockCompanySource {
    fn load_companies(&self) -> Result<Vec<Company>, EsgError> {
        match &self.error {
            Some(reason) => Err(EsgError::InputParse {
                source_name: "mock".to_string(),
                reason: reason.clone(),
            }),
            None => Ok(self.companies.clone()),
        }
    }
}

pub const ACME: &str = "US0000000001";
pub const GLOBEX: &str = "US0000000002";
pub const INITECH: &str = "US0000000003";

pub fn acme() -> Company {
    Company::new(ACME, 1000.0, 100.0, 50.0, 200.0, 400.0).with_name("Acme")
}

pub fn globex() -> Company {
    Company::new(GLOBEX, 500.0, 0.0, 0.0, 0.0, 100.0).with_name("Globex")
}

pub fn initech() -> Company {
    Company::new(INITECH, 250.0, 50.0, 300.0, 10.0, 150.0).with_name("Initech")
}

/// A small universe:
///
/// - `EQ-ACME`, `EQ-GLOBEX`, `EQ-INITECH` are atomic and company-owned
/// - `CASH` is atomic and unowned
/// - `FUND-A` = 0.6 `EQ-ACME` + 0.4 `EQ-GLOBEX`
/// - `FUND-B` = 0.5 `FUND-A` + 0.3 `EQ-INITECH` + 0.2 `CASH`
/// - portfolio `CORE` = 0.7 `FUND-B` + 0.3 `EQ-ACME`
/// - portfolio `DIRECT` = 1.0 `EQ-GLOBEX`
pub struct FixtureUniverse;

impl UniverseSource for FixtureUniverse {
    fn load_into(&self, store: &mut EntityStore) -> Result<(), EsgError> {
        store.put_asset_class(AssetClass {
            id: "equity".into(),
            name: "Equity".into(),
        })?;
        store.put_asset_class(AssetClass {
            id: "cash".into(),
            name: "Cash".into(),
        })?;
        store.put_instrument_type(InstrumentType {
            id: "stock".into(),
            name: "Common stock".into(),
            asset_class: "equity".into(),
        })?;
        store.put_instrument_type(InstrumentType {
            id: "fund".into(),
            name: "Fund".into(),
            asset_class: "equity".into(),
        })?;
        store.put_instrument_type(InstrumentType {
            id: "deposit".into(),
            name: "Deposit".into(),
            asset_class: "cash".into(),
        })?;

        for company in [acme(), globex(), initech()] {
            store.put_company(company)?;
        }
        store.put_instrument(Instrument::new("EQ-ACME", "stock", ACME).owned_by(ACME))?;
        store.put_instrument(Instrument::new("EQ-GLOBEX", "stock", GLOBEX).owned_by(GLOBEX))?;
        store.put_instrument(Instrument::new("EQ-INITECH", "stock", INITECH).owned_by(INITECH))?;
        store.put_instrument(Instrument::new("CASH", "deposit", "XX0000000000"))?;
        store.put_instrument(Instrument::new("FUND-A", "fund", "IE0000000001"))?;
        store.put_instrument(Instrument::new("FUND-B", "fund", "IE0000000002"))?;

        store.set_components("FUND-A", &[("EQ-ACME", 0.6), ("EQ-GLOBEX", 0.4)])?;
        store.set_components(
            "FUND-B",
            &[("FUND-A", 0.5), ("EQ-INITECH", 0.3), ("CASH", 0.2)],
        )?;

        store.put_portfolio("CORE", Some("Core growth"))?;
        store.set_holdings("CORE", &[("FUND-B", 0.7), ("EQ-ACME", 0.3)])?;
        store.put_portfolio("DIRECT", None)?;
        store.set_holdings("DIRECT", &[("EQ-GLOBEX", 1.0)])?;

        for (isin, e, s, g) in [
            (ACME, 40.0, 50.0, 60.0),
            (GLOBEX, 70.0, 80.0, 90.0),
            (INITECH, 10.0, 20.0, 30.0),
        ] {
            store.put_esg_record(
                EsgSubject::Company(isin.to_string()),
                date(2024, 3, 31),
                Some(e),
                Some(s),
                Some(g),
            )?;
        }
        Ok(())
    }
}

pub fn fixture_store() -> EntityStore {
    let mut store = EntityStore::new();
    FixtureUniverse.load_into(&mut store).unwrap();
    store
}

pub const COMPANIES_JSON: &str = r#"[
    {
        "ISIN": "US0000000001",
        "Total CO2 Equivalents Emissions": 1000,
        "Carbon Credit Value": 100,
        "Renewable Energy Purchased": 50,
        "Renewable Energy Produced": 200,
        "Total Energy Use": 400
    },
    {
        "ISIN": "US0000000009",
        "Total CO2 Equivalents Emissions": 20,
        "Carbon Credit Value": 0,
        "Renewable Energy Purchased": 0,
        "Renewable Energy Produced": 0,
        "Total Energy Use": 0
    },
    {
        "ISIN": "US0000000002",
        "Total CO2 Equivalents Emissions": 500,
        "Carbon Credit Value": 0,
        "Renewable Energy Purchased": 0,
        "Renewable Energy Produced": 0,
        "Total Energy Use": "100"
    }
]"#;

pub const UNIVERSE_JSON: &str = r#"{
    "asset_classes": [{"id": "equity", "name": "Equity"}],
    "instrument_types": [
        {"id": "stock", "name": "Common stock", "asset_class": "equity"},
        {"id": "fund", "name": "Fund", "asset_class": "equity"}
    ],
    "companies": [
        {
            "ISIN": "US0000000001",
            "Total CO2 Equivalents Emissions": 1000,
            "Carbon Credit Value": 100,
            "Renewable Energy Purchased": 50,
            "Renewable Energy Produced": 200,
            "Total Energy Use": 400
        },
        {
            "ISIN": "US0000000002",
            "Total CO2 Equivalents Emissions": 500,
            "Carbon Credit Value": 0,
            "Renewable Energy Purchased": 0,
            "Renewable Energy Produced": 0,
            "Total Energy Use": 100
        }
    ],
    "instruments": [
        {"id": "EQ-ACME", "type": "stock", "isin": "US0000000001", "company": "US0000000001"},
        {"id": "EQ-GLOBEX", "type": "stock", "isin": "US0000000002", "company": "US0000000002"},
        {"id": "FUND-A", "type": "fund", "isin": "IE0000000001"}
    ],
    "components": [
        {"compound": "FUND-A", "component": "EQ-ACME", "weight": 0.6},
        {"compound": "FUND-A", "component": "EQ-GLOBEX", "weight": 0.4}
    ],
    "portfolios": [
        {"id": "CORE", "holdings": [{"instrument": "FUND-A", "weight": 0.5}, {"instrument": "EQ-GLOBEX", "weight": 0.5}]}
    ],
    "esg_records": [
        {"subject": {"kind": "company", "id": "US0000000001"}, "date": "2024-03-31", "e": 40, "s": 50, "g": 60},
        {"subject": {"kind": "company", "id": "US0000000002"}, "date": "2024-03-31", "e": 70, "s": 80, "g": 90}
    ]
}"#;
