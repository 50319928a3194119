use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// ── Plant profiles ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompoundProfile {
    pub name: String,
    pub concentration_percent: f64,
    /// 0–1 weight of the compound within its tradition.
    pub traditional_importance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlantProfile {
    pub id: String,
    pub scientific_name: String,
    pub common_names: Vec<String>,
    pub traditional_uses: Vec<String>,
    pub geographic_origin: String,
    pub cultural_contexts: Vec<String>,
    /// 0–1, feeds development confidence and compensation value.
    pub bioactivity_confidence: f64,
    #[serde(default = "default_consensus")]
    pub community_consensus: f64,
    pub compounds: Vec<CompoundProfile>,
}

fn default_consensus() -> f64 {
    0.9
}

impl PlantProfile {
    /// "Common (Scientific)" when a common name exists.
    pub fn display_name(&self) -> String {
        match self.common_names.first() {
            Some(common) => format!("{common} ({})", self.scientific_name),
            None => self.scientific_name.clone(),
        }
    }
}

// ── Deployment modes ───────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentMode {
    Standalone,
    Bundle,
    Ecosystem,
}

impl DeploymentMode {
    /// Unknown names fall back to standalone.
    pub fn parse_or_default(s: &str) -> Self {
        match s {
            "standalone" => Self::Standalone,
            "bundle" => Self::Bundle,
            "ecosystem" => Self::Ecosystem,
            other => {
                log::warn!("unknown deployment mode '{other}', using standalone");
                Self::Standalone
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standalone => "standalone",
            Self::Bundle => "bundle",
            Self::Ecosystem => "ecosystem",
        }
    }
}

/// Illustrative display figures attached to every batch of a mode.
/// These are example values, not measurements.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceProfile {
    pub capacity_per_hour: u64,
    pub speed_improvement: String,
    pub accuracy_enhancement: String,
    pub deployment_flexibility: String,
}

impl PerformanceProfile {
    pub fn as_metrics(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("speed_improvement".to_string(), self.speed_improvement.clone()),
            ("accuracy_enhancement".to_string(), self.accuracy_enhancement.clone()),
            ("deployment_flexibility".to_string(), self.deployment_flexibility.clone()),
            (
                "processing_capacity".to_string(),
                format!("{} optimizations/hour", group_thousands(self.capacity_per_hour)),
            ),
        ])
    }
}

fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Debug, Clone, Deserialize)]
struct DeploymentModesFile {
    modes: HashMap<DeploymentMode, PerformanceProfile>,
}

// ── Pipeline parameters ────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompensationConfig {
    pub enabled: bool,
    /// Amount paid for a contribution of value 0.1; scales linearly.
    pub base_amount: f64,
    pub record_prefix: String,
    /// Weight of the "chemical" knowledge type in the value formula.
    pub knowledge_type_weight: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PipelineParameters {
    pub solvents: Vec<String>,
    pub enhancers: Vec<String>,
    pub max_enhancers: usize,
    pub compensation: CompensationConfig,
}

// ── Top-level config ───────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub plants: BTreeMap<String, PlantProfile>,
    pub deployment_modes: HashMap<DeploymentMode, PerformanceProfile>,
    pub parameters: PipelineParameters,
}

impl DemoConfig {
    /// Load every plant profile under `{data_dir}/plants/`, the deployment
    /// mode table and the pipeline parameters.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let plants_dir = format!("{data_dir}/plants");
        let entries = std::fs::read_dir(&plants_dir)
            .map_err(|e| anyhow::anyhow!("Cannot read {plants_dir}: {e}"))?;
        let mut plants = BTreeMap::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let content = std::fs::read_to_string(&path)
                .map_err(|e| anyhow::anyhow!("Cannot read {}: {e}", path.display()))?;
            let plant: PlantProfile = serde_json::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid plant profile {}: {e}", path.display()))?;
            if plants.contains_key(&plant.id) {
                anyhow::bail!("Duplicate plant id '{}' in {}", plant.id, path.display());
            }
            plants.insert(plant.id.clone(), plant);
        }
        if plants.is_empty() {
            anyhow::bail!("No plant profiles found in {plants_dir}");
        }

        let modes_path = format!("{data_dir}/deployment/modes.json");
        let modes_content = std::fs::read_to_string(&modes_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {modes_path}: {e}"))?;
        let modes_file: DeploymentModesFile = serde_json::from_str(&modes_content)
            .map_err(|e| anyhow::anyhow!("Invalid deployment modes {modes_path}: {e}"))?;

        let params_path = format!("{data_dir}/pipeline/parameters.json");
        let params_content = std::fs::read_to_string(&params_path)
            .map_err(|e| anyhow::anyhow!("Cannot read {params_path}: {e}"))?;
        let parameters: PipelineParameters = serde_json::from_str(&params_content)
            .map_err(|e| anyhow::anyhow!("Invalid pipeline parameters {params_path}: {e}"))?;

        log::info!(
            "config: loaded {} plant profiles, {} deployment modes from {data_dir}",
            plants.len(),
            modes_file.modes.len()
        );

        Ok(Self {
            plants,
            deployment_modes: modes_file.modes,
            parameters,
        })
    }

    /// Performance figures for a mode, falling back to standalone.
    pub fn performance_for(&self, mode: DeploymentMode) -> Option<&PerformanceProfile> {
        self.deployment_modes
            .get(&mode)
            .or_else(|| self.deployment_modes.get(&DeploymentMode::Standalone))
    }

    pub fn plant(&self, id: &str) -> Option<&PlantProfile> {
        self.plants.get(id)
    }

    /// In-memory configuration with one plant, for tests.
    pub fn default_test() -> Self {
        let plant = PlantProfile {
            id: "ashwagandha".to_string(),
            scientific_name: "Withania somnifera".to_string(),
            common_names: vec!["Ashwagandha".to_string(), "Indian Winter Cherry".to_string()],
            traditional_uses: vec![
                "Stress and anxiety relief".to_string(),
                "Sleep enhancement".to_string(),
            ],
            geographic_origin: "India, Middle East, North Africa".to_string(),
            cultural_contexts: vec!["Ayurveda".to_string(), "Unani Medicine".to_string()],
            bioactivity_confidence: 0.92,
            community_consensus: 0.9,
            compounds: vec![
                CompoundProfile {
                    name: "Withanoside IV".to_string(),
                    concentration_percent: 0.3,
                    traditional_importance: 0.9,
                },
                CompoundProfile {
                    name: "Withanoside VI".to_string(),
                    concentration_percent: 0.15,
                    traditional_importance: 0.8,
                },
                CompoundProfile {
                    name: "Withanolide D".to_string(),
                    concentration_percent: 0.05,
                    traditional_importance: 0.95,
                },
            ],
        };

        let deployment_modes = HashMap::from([
            (
                DeploymentMode::Standalone,
                PerformanceProfile {
                    capacity_per_hour: 22_000,
                    speed_improvement: "54.3%".to_string(),
                    accuracy_enhancement: "42.8%".to_string(),
                    deployment_flexibility: "94%".to_string(),
                },
            ),
            (
                DeploymentMode::Bundle,
                PerformanceProfile {
                    capacity_per_hour: 45_000,
                    speed_improvement: "58.7%".to_string(),
                    accuracy_enhancement: "45.2%".to_string(),
                    deployment_flexibility: "96%".to_string(),
                },
            ),
        ]);

        Self {
            plants: BTreeMap::from([(plant.id.clone(), plant)]),
            deployment_modes,
            parameters: PipelineParameters {
                solvents: ["ghee", "honey", "coconut_oil", "sesame_oil"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                enhancers: ["piperine", "ghee", "honey", "ginger", "turmeric"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                max_enhancers: 3,
                compensation: CompensationConfig {
                    enabled: true,
                    base_amount: 1000.0,
                    record_prefix: "COMP".to_string(),
                    knowledge_type_weight: 0.4,
                },
            },
        }
    }
}
