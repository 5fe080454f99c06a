//! Load machine definitions from CSV or JSON files

use super::data::parse_launch_month;
use super::{MachineDefinition, MachineParams};
use crate::error::LoadError;
use csv::Reader;
use std::path::Path;

/// Default location of the editable machine set
pub const DEFAULT_MACHINES_PATH: &str = "data/machines.csv";

/// Raw CSV row; launch date and the employee column are optional
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    name: String,
    currency: String,
    #[serde(default)]
    launch_date: Option<String>,
    initial_aum: f64,
    monthly_growth_rate: f64,
    yield_apr: f64,
    management_fee_rate: f64,
    management_fee_makina_share: f64,
    performance_fee_rate: f64,
    performance_fee_makina_share: f64,
    net_return_margin: f64,
    #[serde(default)]
    employee_capital_share: Option<f64>,
}

impl CsvRow {
    /// `row` is 1-based, counting data rows only
    fn to_machine(self, row: usize) -> Result<MachineDefinition, LoadError> {
        let currency = self
            .currency
            .parse()
            .map_err(|source| LoadError::InvalidCurrency { row, source })?;

        let launch_date = match self.launch_date.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(value) => Some(parse_launch_month(value).ok_or_else(|| {
                LoadError::InvalidLaunchDate {
                    row,
                    value: value.to_string(),
                }
            })?),
        };

        MachineParams {
            name: self.name,
            currency,
            launch_date,
            initial_aum: self.initial_aum,
            monthly_growth_rate: self.monthly_growth_rate,
            yield_apr: self.yield_apr,
            management_fee_rate: self.management_fee_rate,
            management_fee_makina_share: self.management_fee_makina_share,
            performance_fee_rate: self.performance_fee_rate,
            performance_fee_makina_share: self.performance_fee_makina_share,
            net_return_margin: self.net_return_margin,
            employee_capital_share: self.employee_capital_share.unwrap_or(0.0),
        }
        .build()
        .map_err(|source| LoadError::InvalidRow { row, source })
    }
}

/// Load machines from a `.csv` or `.json` file, chosen by extension
pub fn load_machines<P: AsRef<Path>>(path: P) -> Result<Vec<MachineDefinition>, LoadError> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("csv") => load_machines_csv(Reader::from_path(path)?),
        Some("json") => load_machines_json(std::fs::File::open(path)?),
        _ => Err(LoadError::UnsupportedFormat(path.display().to_string())),
    }
}

/// Load machines from CSV text in any reader
pub fn load_machines_from_reader<R: std::io::Read>(
    reader: R,
) -> Result<Vec<MachineDefinition>, LoadError> {
    load_machines_csv(Reader::from_reader(reader))
}

fn load_machines_csv<R: std::io::Read>(
    mut reader: Reader<R>,
) -> Result<Vec<MachineDefinition>, LoadError> {
    let mut machines = Vec::new();

    for (idx, result) in reader.deserialize().enumerate() {
        let row: CsvRow = result?;
        machines.push(row.to_machine(idx + 1)?);
    }

    log::debug!("Loaded {} machines from CSV", machines.len());
    Ok(machines)
}

/// Load machines from a JSON array of parameter objects
///
/// Rate fields are required, as in CSV; only `launch_date` and
/// `employee_capital_share` may be omitted.
pub fn load_machines_json<R: std::io::Read>(
    reader: R,
) -> Result<Vec<MachineDefinition>, LoadError> {
    let params: Vec<MachineParams> = serde_json::from_reader(reader)?;

    params
        .into_iter()
        .enumerate()
        .map(|(idx, p)| {
            p.build()
                .map_err(|source| LoadError::InvalidRow { row: idx + 1, source })
        })
        .collect()
}

/// Load machines from the default `data/machines.csv` location
pub fn load_default_machines() -> Result<Vec<MachineDefinition>, LoadError> {
    load_machines(DEFAULT_MACHINES_PATH)
}

/// Write machines back out in the CSV layout [`load_machines`] reads
pub fn write_machines_csv<W: std::io::Write>(
    writer: W,
    machines: &[MachineDefinition],
) -> Result<(), LoadError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record([
        "name",
        "currency",
        "launch_date",
        "initial_aum",
        "monthly_growth_rate",
        "yield_apr",
        "management_fee_rate",
        "management_fee_makina_share",
        "performance_fee_rate",
        "performance_fee_makina_share",
        "net_return_margin",
        "employee_capital_share",
    ])?;

    for m in machines {
        csv_writer.write_record([
            m.name().to_string(),
            m.currency().to_string(),
            m.launch_date().map(|d| d.to_string()).unwrap_or_default(),
            m.initial_aum().to_string(),
            m.monthly_growth_rate().to_string(),
            m.yield_apr().to_string(),
            m.management_fee_rate().to_string(),
            m.management_fee_makina_share().to_string(),
            m.performance_fee_rate().to_string(),
            m.performance_fee_makina_share().to_string(),
            m.net_return_margin().to_string(),
            m.employee_capital_share().to_string(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::CalendarMonth;
    use crate::error::ValidationError;
    use crate::pricing::Currency;

    const HEADER: &str = "name,currency,launch_date,initial_aum,monthly_growth_rate,yield_apr,\
management_fee_rate,management_fee_makina_share,performance_fee_rate,\
performance_fee_makina_share,net_return_margin,employee_capital_share\n";

    #[test]
    fn test_load_default_machines() {
        let machines = load_default_machines().expect("Failed to load machines");
        assert_eq!(machines.len(), 7);
        assert_eq!(machines[0].name(), "DETH");
        assert_eq!(machines[0].currency(), Currency::Eth);
        assert_eq!(machines[3].name(), "Lido");
        assert_eq!(machines[3].launch_date(), CalendarMonth::new(2026, 2));
    }

    #[test]
    fn test_blank_launch_date_is_none() {
        let csv = format!("{HEADER}DUSD,USD,,55000000,0.1,0.08,0.01,0.4,0.15,0.4,0.7,\n");
        let machines = load_machines_from_reader(csv.as_bytes()).unwrap();
        assert_eq!(machines[0].launch_date(), None);
        assert_eq!(machines[0].employee_capital_share(), 0.0);
    }

    #[test]
    fn test_invalid_rows_report_row_number() {
        let csv = format!(
            "{HEADER}A,USD,,1,0.1,0.08,0.01,0.4,0.15,0.4,0.7,0\nB,USD,,-5,0.1,0.08,0.01,0.4,0.15,0.4,0.7,0\n"
        );
        match load_machines_from_reader(csv.as_bytes()) {
            Err(LoadError::InvalidRow { row, source }) => {
                assert_eq!(row, 2);
                assert_eq!(source, ValidationError::NegativeAum(-5.0));
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let csv = format!("{HEADER}A,SOL,,1,0.1,0.08,0.01,0.4,0.15,0.4,0.7,0\n");
        assert!(matches!(
            load_machines_from_reader(csv.as_bytes()),
            Err(LoadError::InvalidCurrency { row: 1, .. })
        ));

        let csv = format!("{HEADER}A,USD,soon,1,0.1,0.08,0.01,0.4,0.15,0.4,0.7,0\n");
        assert!(matches!(
            load_machines_from_reader(csv.as_bytes()),
            Err(LoadError::InvalidLaunchDate { row: 1, .. })
        ));
    }

    #[test]
    fn test_csv_writer_reloads() {
        let machines = crate::machine::base_case_machines().unwrap();
        let mut buffer = Vec::new();
        write_machines_csv(&mut buffer, &machines).unwrap();

        let reloaded = load_machines_from_reader(buffer.as_slice()).unwrap();
        assert_eq!(reloaded, machines);
    }

    #[test]
    fn test_json_optional_fields_and_currency_case() {
        let json = r#"[{"name": "DETH", "currency": "eth", "initial_aum": 9300,
            "monthly_growth_rate": 0.1, "yield_apr": 0.05, "management_fee_rate": 0.0075,
            "management_fee_makina_share": 0.4, "performance_fee_rate": 0.13,
            "performance_fee_makina_share": 0.4, "net_return_margin": 0.7}]"#;
        let machines = load_machines_json(json.as_bytes()).unwrap();
        assert_eq!(machines[0].currency(), Currency::Eth);
        assert_eq!(machines[0].launch_date(), None);
        assert_eq!(machines[0].employee_capital_share(), 0.0);
        assert_eq!(machines[0].yield_apr(), 0.05);
    }

    #[test]
    fn test_json_missing_rate_is_rejected() {
        let json = r#"[{"name": "DETH", "currency": "ETH", "initial_aum": 9300, "yield_apr": 0.05}]"#;
        assert!(matches!(load_machines_json(json.as_bytes()), Err(LoadError::Json(_))));
    }
}
