//! Machine configuration: raw parameters and the validated definition

use crate::calendar::CalendarMonth;
use crate::error::ValidationError;
use crate::pricing::Currency;
use serde::{Deserialize, Deserializer, Serialize};

/// Unvalidated machine parameters, as entered or loaded from a file
///
/// When read from JSON every field is required except `launch_date` and
/// `employee_capital_share`, matching the CSV columns. [`Default`] holds the
/// values a newly created machine starts with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineParams {
    pub name: String,
    pub currency: Currency,

    /// First active month; a mid-month date rounds up to the next month
    #[serde(default, deserialize_with = "deserialize_launch_month")]
    pub launch_date: Option<CalendarMonth>,

    pub initial_aum: f64,

    /// Monthly additions as a fraction of initial AUM
    pub monthly_growth_rate: f64,

    pub yield_apr: f64,
    pub management_fee_rate: f64,
    pub management_fee_makina_share: f64,
    pub performance_fee_rate: f64,
    pub performance_fee_makina_share: f64,
    pub net_return_margin: f64,

    /// Share of the yield base owned by employee capital (no performance fee)
    #[serde(default)]
    pub employee_capital_share: f64,
}

impl Default for MachineParams {
    fn default() -> Self {
        Self {
            name: String::new(),
            currency: Currency::Usd,
            launch_date: None,
            initial_aum: 0.0,
            monthly_growth_rate: 0.10,
            yield_apr: 0.08,
            management_fee_rate: 0.0075,
            management_fee_makina_share: 0.40,
            performance_fee_rate: 0.15,
            performance_fee_makina_share: 0.40,
            net_return_margin: 0.70,
            employee_capital_share: 0.0,
        }
    }
}

impl MachineParams {
    /// Validate and freeze into a [`MachineDefinition`]
    pub fn build(self) -> Result<MachineDefinition, ValidationError> {
        MachineDefinition::new(self)
    }
}

/// Parse a launch date string: `YYYY-MM` is taken as-is, `YYYY-MM-DD` rounds
/// up to the first whole month
pub fn parse_launch_month(value: &str) -> Option<CalendarMonth> {
    let value = value.trim();
    if let Ok(date) = chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(CalendarMonth::first_full_month_from(date));
    }
    value.parse().ok()
}

fn deserialize_launch_month<'de, D>(deserializer: D) -> Result<Option<CalendarMonth>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => parse_launch_month(value).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("invalid launch date '{}'", value))
        }),
    }
}

/// Validated, immutable configuration for one strategy
///
/// Construction is the only place range checks happen; the projection engine
/// trusts every field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "MachineParams", into = "MachineParams")]
pub struct MachineDefinition {
    params: MachineParams,
}

impl MachineDefinition {
    pub fn new(params: MachineParams) -> Result<Self, ValidationError> {
        if params.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let finite_fields = [
            ("initial_aum", params.initial_aum),
            ("monthly_growth_rate", params.monthly_growth_rate),
            ("yield_apr", params.yield_apr),
            ("management_fee_rate", params.management_fee_rate),
            ("management_fee_makina_share", params.management_fee_makina_share),
            ("performance_fee_rate", params.performance_fee_rate),
            ("performance_fee_makina_share", params.performance_fee_makina_share),
            ("net_return_margin", params.net_return_margin),
            ("employee_capital_share", params.employee_capital_share),
        ];
        for (field, value) in finite_fields {
            if !value.is_finite() {
                return Err(ValidationError::NonFinite { field });
            }
        }

        if params.initial_aum < 0.0 {
            return Err(ValidationError::NegativeAum(params.initial_aum));
        }
        if params.monthly_growth_rate < -1.0 {
            return Err(ValidationError::GrowthRateOutOfRange(params.monthly_growth_rate));
        }

        // Everything after initial_aum and growth is a unit-interval rate
        for (field, value) in finite_fields.into_iter().skip(2) {
            if !(0.0..=1.0).contains(&value) {
                return Err(ValidationError::RateOutOfRange { field, value });
            }
        }

        Ok(Self { params })
    }

    /// Copy of this machine under a new name, every other parameter identical
    pub fn clone_as(&self, name: impl Into<String>) -> Result<Self, ValidationError> {
        Self::new(MachineParams {
            name: name.into(),
            ..self.params.clone()
        })
    }

    /// Editable copy of the parameters
    pub fn to_params(&self) -> MachineParams {
        self.params.clone()
    }

    pub fn name(&self) -> &str {
        &self.params.name
    }

    pub fn currency(&self) -> Currency {
        self.params.currency
    }

    pub fn launch_date(&self) -> Option<CalendarMonth> {
        self.params.launch_date
    }

    pub fn initial_aum(&self) -> f64 {
        self.params.initial_aum
    }

    pub fn monthly_growth_rate(&self) -> f64 {
        self.params.monthly_growth_rate
    }

    pub fn yield_apr(&self) -> f64 {
        self.params.yield_apr
    }

    pub fn management_fee_rate(&self) -> f64 {
        self.params.management_fee_rate
    }

    pub fn management_fee_makina_share(&self) -> f64 {
        self.params.management_fee_makina_share
    }

    pub fn performance_fee_rate(&self) -> f64 {
        self.params.performance_fee_rate
    }

    pub fn performance_fee_makina_share(&self) -> f64 {
        self.params.performance_fee_makina_share
    }

    pub fn net_return_margin(&self) -> f64 {
        self.params.net_return_margin
    }

    pub fn employee_capital_share(&self) -> f64 {
        self.params.employee_capital_share
    }

    /// Annual management fee rate retained by Makina (total x share)
    pub fn management_fee_makina_rate(&self) -> f64 {
        self.params.management_fee_rate * self.params.management_fee_makina_share
    }

    /// Performance fee rate retained by Makina (total x share)
    pub fn performance_fee_makina_rate(&self) -> f64 {
        self.params.performance_fee_rate * self.params.performance_fee_makina_share
    }
}

impl TryFrom<MachineParams> for MachineDefinition {
    type Error = ValidationError;

    fn try_from(params: MachineParams) -> Result<Self, Self::Error> {
        Self::new(params)
    }
}

impl From<MachineDefinition> for MachineParams {
    fn from(machine: MachineDefinition) -> Self {
        machine.params
    }
}
