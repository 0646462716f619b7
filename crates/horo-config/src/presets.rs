//! Named defining data for groups with well-understood horospheres.

use serde::{Deserialize, Serialize};

use crate::config::HorosphereConfig;
use crate::error::{ConfigError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    InfiniteDihedral,
    VirtualSurface,
    AlmostVirtualSurface,
    SierpinskiCarpet,
    WeirdGroup,
    ThetaGraph,
}

impl Preset {
    pub fn all() -> [Preset; 6] {
        [
            Self::InfiniteDihedral,
            Self::VirtualSurface,
            Self::AlmostVirtualSurface,
            Self::SierpinskiCarpet,
            Self::WeirdGroup,
            Self::ThetaGraph,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::InfiniteDihedral => "infinite-dihedral",
            Self::VirtualSurface => "virtual-surface",
            Self::AlmostVirtualSurface => "almost-virtual-surface",
            Self::SierpinskiCarpet => "sierpinski-carpet",
            Self::WeirdGroup => "weird-group",
            Self::ThetaGraph => "theta-graph",
        }
    }

    pub fn from_name(name: &str) -> Result<Self> {
        Self::all()
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }

    fn document(&self) -> &'static str {
        match self {
            Self::InfiniteDihedral => include_str!("../presets/infinite-dihedral.toml"),
            Self::VirtualSurface => include_str!("../presets/virtual-surface.toml"),
            Self::AlmostVirtualSurface => include_str!("../presets/almost-virtual-surface.toml"),
            Self::SierpinskiCarpet => include_str!("../presets/sierpinski-carpet.toml"),
            Self::WeirdGroup => include_str!("../presets/weird-group.toml"),
            Self::ThetaGraph => include_str!("../presets/theta-graph.toml"),
        }
    }

    pub fn config(&self) -> Result<HorosphereConfig> {
        HorosphereConfig::from_toml_str(self.document())
    }
}

/// Defining data of the preset called `name`.
pub fn preset(name: &str) -> Result<HorosphereConfig> {
    Preset::from_name(name)?.config()
}
