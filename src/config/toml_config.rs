use crate::core::Facility;
use crate::domain::{Clock, FareUnit, SizeClass, VehicleKind};
use crate::utils::error::{ParkingError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityConfig {
    pub facility: FacilitySection,
    #[serde(default)]
    pub slots: Vec<SlotGroup>,
    #[serde(default)]
    pub events: Vec<EventConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilitySection {
    pub name: String,
    pub fare_unit: Option<FareUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotGroup {
    pub class: String,
    pub count: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventAction {
    Park,
    Leave,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventConfig {
    pub at_seconds: u64,
    pub action: EventAction,
    pub plate: String,
    pub kind: Option<String>,
}

impl EventConfig {
    /// 解析車種，僅 park 事件需要
    pub fn vehicle_kind(&self, field: &str) -> Result<VehicleKind> {
        let kind = validation::validate_required_field(field, &self.kind)?;
        kind.parse::<VehicleKind>()
            .map_err(|e| ParkingError::InvalidConfigValueError {
                field: field.to_string(),
                value: kind.clone(),
                reason: e.to_string(),
            })
    }
}

impl FacilityConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ParkingError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ParkingError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${LOT_NAME})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ParkingError::ConfigError {
            message: format!("env var pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.into_owned())
    }

    pub fn fare_unit(&self) -> FareUnit {
        self.facility.fare_unit.unwrap_or_default()
    }

    /// Parsed slot inventory as `(class, count)` pairs in file order.
    pub fn slot_groups(&self) -> Result<Vec<(SizeClass, usize)>> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, group)| {
                let field = format!("slots[{}].class", i);
                let class = group
                    .class
                    .parse::<VehicleKind>()
                    .map_err(|e| ParkingError::InvalidConfigValueError {
                        field,
                        value: group.class.clone(),
                        reason: e.to_string(),
                    })?
                    .size_class();
                Ok((class, group.count.unwrap_or(1)))
            })
            .collect()
    }

    pub fn total_slots(&self) -> usize {
        self.slots.iter().map(|g| g.count.unwrap_or(1)).sum()
    }

    /// Builds a facility holding the configured inventory, all slots free.
    pub fn build_facility(&self, clock: Arc<dyn Clock>) -> Result<Facility> {
        let facility = Facility::new(self.facility.name.clone(), clock).with_fare_unit(self.fare_unit());
        for (class, count) in self.slot_groups()? {
            facility.add_slots(class, count);
        }
        tracing::info!(
            facility = %facility.name(),
            slots = facility.slot_count(),
            fare_unit = %facility.fare_unit(),
            "facility configured"
        );
        Ok(facility)
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_non_empty_string("facility.name", &self.facility.name)?;

        if self.slots.is_empty() {
            return Err(ParkingError::ConfigValidationError {
                field: "slots".to_string(),
                message: "At least one slot group is required".to_string(),
            });
        }

        for (i, group) in self.slots.iter().enumerate() {
            if let Some(count) = group.count {
                validation::validate_positive_number(&format!("slots[{}].count", i), count, 1)?;
            }
        }
        self.slot_groups()?;

        let offsets: Vec<u64> = self.events.iter().map(|e| e.at_seconds).collect();
        validation::validate_non_decreasing("events.at_seconds", &offsets)?;

        for (i, event) in self.events.iter().enumerate() {
            validation::validate_non_empty_string(&format!("events[{}].plate", i), &event.plate)?;
            if event.action == EventAction::Park {
                event.vehicle_kind(&format!("events[{}].kind", i))?;
            }
        }

        Ok(())
    }
}

impl Validate for FacilityConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
