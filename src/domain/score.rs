//! Risk-adjusted carbon emissions score.
//!
//! `(co2_tot - cc) * (1 - min(mu_purch * re_purch / e_tot, mu_max)) - phi_prod * re_prod`
//!
//! Carbon credits are netted off before the renewable-purchase discount is
//! applied. The discount fraction is capped at `mu_max`; renewable production
//! is an uncapped flat deduction and can drive the score below zero.

use super::company::Company;
use super::error::EsgError;

pub const DEFAULT_MU_PURCH: f64 = 0.5;
pub const DEFAULT_MU_MAX: f64 = 0.8;
pub const DEFAULT_PHI_PROD: f64 = 0.005;

/// Tunable policy parameters of the scoring formula.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringParams {
    /// Discount per unit of purchased renewable energy relative to total use.
    pub mu_purch: f64,
    /// Upper bound on the purchase discount fraction.
    pub mu_max: f64,
    /// Tonnes of CO2 deducted per unit of renewable energy produced.
    pub phi_prod: f64,
}

impl Default for ScoringParams {
    fn default() -> Self {
        ScoringParams {
            mu_purch: DEFAULT_MU_PURCH,
            mu_max: DEFAULT_MU_MAX,
            phi_prod: DEFAULT_PHI_PROD,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreCalculator {
    pub params: ScoringParams,
}

impl ScoreCalculator {
    pub fn new(params: ScoringParams) -> Self {
        ScoreCalculator { params }
    }

    /// The capped renewable-purchase discount fraction.
    pub fn discount_fraction(&self, company: &Company) -> Result<f64, EsgError> {
        if company.e_tot == 0.0 {
            return Err(EsgError::DivisionByZero {
                isin: company.isin.clone(),
            });
        }
        let uncapped = self.params.mu_purch * company.re_purch / company.e_tot;
        Ok(uncapped.min(self.params.mu_max))
    }

    pub fn adjusted_total_emissions(&self, company: &Company) -> Result<f64, EsgError> {
        let discount = self.discount_fraction(company)?;
        Ok((company.co2_tot - company.cc) * (1.0 - discount)
            - self.params.phi_prod * company.re_prod)
    }
}

/// Scores `company` with the default parameters.
pub fn adjusted_total_emissions(company: &Company) -> Result<f64, EsgError> {
    ScoreCalculator::default().adjusted_total_emissions(company)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn company(co2_tot: f64, cc: f64, re_purch: f64, re_prod: f64, e_tot: f64) -> Company {
        Company::new("", co2_tot, cc, re_purch, re_prod, e_tot)
    }

    #[test]
    fn purchase_discount_applies_to_gross_emissions() {
        let score = adjusted_total_emissions(&company(1.0, 0.0, 1.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(score, DEFAULT_MU_PURCH, epsilon = 1e-12);
    }

    #[test]
    fn carbon_credit_reduces_before_discount() {
        let score = adjusted_total_emissions(&company(0.0, 1.0, 1.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(score, -DEFAULT_MU_PURCH, epsilon = 1e-12);
    }

    #[test]
    fn no_renewables_yields_net_emissions() {
        let score = adjusted_total_emissions(&company(1.0, 0.0, 0.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(score, 1.0, epsilon = 1e-12);

        let score = adjusted_total_emissions(&company(250.0, 40.0, 0.0, 0.0, 9.0)).unwrap();
        assert_relative_eq!(score, 210.0, epsilon = 1e-12);
    }

    #[test]
    fn all_zero_with_energy_scores_zero() {
        let score = adjusted_total_emissions(&company(0.0, 0.0, 0.0, 0.0, 1.0)).unwrap();
        assert_eq!(score, 0.0);
    }

    #[test]
    fn production_only_yields_negative_phi() {
        let score = adjusted_total_emissions(&company(0.0, 0.0, 0.0, 1.0, 1.0)).unwrap();
        assert_eq!(score, -DEFAULT_PHI_PROD);
    }

    #[test]
    fn discount_capped_at_mu_max() {
        let calc = ScoreCalculator::default();
        let c = company(1.0, 0.0, 2.0, 0.0, 1.0);
        assert_eq!(calc.discount_fraction(&c).unwrap(), DEFAULT_MU_MAX);
        assert_relative_eq!(calc.adjusted_total_emissions(&c).unwrap(), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn discount_below_cap_is_uncapped_ratio() {
        let calc = ScoreCalculator::default();
        let c = company(1.0, 0.0, 1.5, 0.0, 1.0);
        assert_relative_eq!(calc.discount_fraction(&c).unwrap(), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn zero_energy_is_division_by_zero() {
        let err = adjusted_total_emissions(&company(1.0, 1.0, 1.0, 1.0, 0.0)).unwrap_err();
        assert!(matches!(err, EsgError::DivisionByZero { .. }));
    }

    #[test]
    fn custom_params_are_honoured() {
        let calc = ScoreCalculator::new(ScoringParams {
            mu_purch: 1.0,
            mu_max: 0.5,
            phi_prod: 0.1,
        });
        let score = calc
            .adjusted_total_emissions(&company(100.0, 0.0, 10.0, 10.0, 100.0))
            .unwrap();
        assert_relative_eq!(score, 100.0 * 0.9 - 1.0, epsilon = 1e-12);
    }

    #[test]
    fn regression_against_reference_data() {
        let cases = [
            (94972.49198, 8171.323352, 10576.00479, 96652.16115, 7000000.0, 86252.33570973662),
            (306900.6192, 57387.1, 31961.79405, 38372.1921, 80000000.0, 249271.81511629152),
            (171320.1651, 84303.7259, 62884.91047, 10689.83474, 153000000.0, 86945.10760476893),
            (2250.272892, 45713.96386, 12949.74785, 27468.66907, 226000000.0, -43599.78908361844),
            (132696.7376, 17515.5, 42559.65263, 69567.95366, 299000000.0, 114825.20038443955),
            (204269.3867, 26647.856, 9991.766644, 55829.34503, 372000000.0, 177339.9985543047),
            (64963.62994, 10556.11359, 9515.906056, 24720.73308, 445000000.0, 54283.33095784233),
            (89288.41927, 8902.593156, 32904.92748, 4051.865565, 518000000.0, 80363.01361071294),
            (59887.44837, 8838.602818, 4408.314004, 31232.14481, 591000000.0, 50892.49443933685),
            (270793.8773, 2135.478871, 6147.617183, 9418.298827, 664000000.0, 268610.0632533993),
            (436123.8946, 45901.30643, 61287.84832, 9800.114222, 737000000.0, 390157.36242738744),
            (219384.6241, 47047.32813, 18766.81362, 13746.23147, 810000000.0, 172266.56837937018),
            (907965.0176, 3432.989027, 11742.15742, 15078.18917, 883000000.0, 904450.6233816964),
            (63194.4312, 6784.725662, 76353.30911, 49.54423131, 956000000.0, 56407.20516638124),
            (58244.40199, 2965.056586, 898.2632691, 903570.7574, 1029000000.0, 50761.46748900898),
            (9657.810784, 83257.80621, 9985.097548, 14877.02366, 1102000000.0, -73674.04710367664),
            (8939.83813, 7357.74964, 10044.20882, 3664.637195, 1175000000.0, 1563.7585419708873),
            (294541.4886, 31341.08653, 29398.99459, 28384.09547, 1248000000.0, 263055.3815016257),
            (617044.557, 8289.310471, 15389.82384, 6266.641717, 1321000000.0, 608720.3672810487),
            (683013.3757, 9323.29235, 25050.59721, 3177.824916, 1394000000.0, 673668.1410192068),
        ];

        for (co2_tot, cc, re_purch, re_prod, e_tot, expected) in cases {
            let score = adjusted_total_emissions(&company(co2_tot, cc, re_purch, re_prod, e_tot))
                .unwrap();
            assert_relative_eq!(score, expected, max_relative = 1e-9);
        }
    }

    proptest! {
        #[test]
        fn matches_closed_form(
            co2_tot in 0.0..1e6f64,
            cc in 0.0..1e5f64,
            re_purch in 0.0..1e6f64,
            re_prod in 0.0..1e6f64,
            e_tot in 1e-3..1e9f64,
        ) {
            let c = company(co2_tot, cc, re_purch, re_prod, e_tot);
            let expected = (co2_tot - cc) * (1.0 - (0.5 * re_purch / e_tot).min(0.8)) - 0.005 * re_prod;
            let first = adjusted_total_emissions(&c).unwrap();
            let second = adjusted_total_emissions(&c).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!((first - expected).abs() <= 1e-9 * expected.abs().max(1.0));
        }

        #[test]
        fn discount_never_exceeds_cap(
            re_purch in 0.0..1e9f64,
            e_tot in 1e-3..1e6f64,
        ) {
            let calc = ScoreCalculator::default();
            let fraction = calc.discount_fraction(&company(1.0, 0.0, re_purch, 0.0, e_tot)).unwrap();
            prop_assert!(fraction <= DEFAULT_MU_MAX);
            if re_purch > 1.61 * e_tot {
                prop_assert_eq!(fraction, DEFAULT_MU_MAX);
            }
        }
    }
}
