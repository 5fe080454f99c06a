//! Built-in base-case machine set

use super::{MachineDefinition, MachineParams};
use crate::calendar::CalendarMonth;
use crate::error::ValidationError;
use crate::pricing::Currency;

/// The seven machines of the base case
///
/// DETH/DUSD/DBIT are live from the start; Lido and the three DNEW vaults
/// launch during 2026.
pub fn base_case_machines() -> Result<Vec<MachineDefinition>, ValidationError> {
    let launch = |month| CalendarMonth::new(2026, month);

    let dnew = |name: &str, month| MachineParams {
        name: name.to_string(),
        currency: Currency::Usd,
        launch_date: launch(month),
        initial_aum: 55_000_000.0,
        ..Default::default()
    };

    let machines = vec![
        MachineParams {
            name: "DETH".to_string(),
            currency: Currency::Eth,
            initial_aum: 9_300.0,
            performance_fee_rate: 0.13,
            yield_apr: 0.05,
            ..Default::default()
        },
        MachineParams {
            name: "DUSD".to_string(),
            currency: Currency::Usd,
            initial_aum: 55_000_000.0,
            management_fee_rate: 0.01,
            ..Default::default()
        },
        MachineParams {
            name: "DBIT".to_string(),
            currency: Currency::Btc,
            initial_aum: 200.0,
            management_fee_rate: 0.005,
            performance_fee_rate: 0.10,
            yield_apr: 0.03,
            ..Default::default()
        },
        MachineParams {
            name: "Lido".to_string(),
            currency: Currency::Usd,
            launch_date: launch(2),
            initial_aum: 400_000_000.0,
            monthly_growth_rate: 0.0,
            management_fee_rate: 0.0015,
            management_fee_makina_share: 0.115_384_615_4,
            performance_fee_rate: 0.13,
            performance_fee_makina_share: 0.115_384_615_4,
            ..Default::default()
        },
        dnew("DNEW 1", 4),
        dnew("DNEW 2", 5),
        dnew("DNEW 3", 6),
    ];

    machines.into_iter().map(MachineParams::build).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_case_is_valid() {
        let machines = base_case_machines().unwrap();
        assert_eq!(machines.len(), 7);

        let names: Vec<_> = machines.iter().map(|m| m.name()).collect();
        assert_eq!(names, ["DETH", "DUSD", "DBIT", "Lido", "DNEW 1", "DNEW 2", "DNEW 3"]);

        let lido = &machines[3];
        assert_eq!(lido.launch_date(), CalendarMonth::new(2026, 2));
        assert_eq!(lido.monthly_growth_rate(), 0.0);
    }
}
