// midodebug - troubleshooting CLI for MidoNet virtual topologies
// Copyright (C) 2024 Mathias Uhl <mathiasuhl@gmx.de>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Cloud instance lookup.
//!
//! The inventory is read from a file: either the JSON printed by
//! `describe-instances` (EC2 and Eucalyptus tooling both emit it) or a plain
//! YAML/JSON list of instances.

use serde::{Deserialize, Serialize};
use std::{fs, io, path::Path, path::PathBuf};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub vpc_id: Option<String>,
    #[serde(default)]
    pub private_ip: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

#[derive(Debug, Error)]
pub enum InventoryError {
    #[error("reading inventory {path:?}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing instance inventory")]
    Parse(#[from] serde_yaml::Error),
}

pub trait InstanceLookup {
    /// Instances whose id equals `idstring`; every instance when it is empty.
    fn get_instances(&self, idstring: &str) -> anyhow::Result<Vec<Instance>>;
}

#[derive(Debug, Clone, Default)]
pub struct Inventory {
    instances: Vec<Instance>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum InventoryDoc {
    Described {
        #[serde(rename = "Reservations")]
        reservations: Vec<Reservation>,
    },
    Listed {
        instances: Vec<Instance>,
    },
    Bare(Vec<Instance>),
}

#[derive(Deserialize)]
struct Reservation {
    #[serde(rename = "Instances", default)]
    instances: Vec<DescribedInstance>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribedInstance {
    instance_id: String,
    #[serde(default)]
    vpc_id: Option<String>,
    #[serde(default)]
    private_ip_address: Option<String>,
    #[serde(default)]
    state: Option<DescribedState>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct DescribedState {
    name: String,
}

impl From<DescribedInstance> for Instance {
    fn from(value: DescribedInstance) -> Self {
        Instance {
            id: value.instance_id,
            vpc_id: value.vpc_id,
            private_ip: value.private_ip_address,
            state: value.state.map(|s| s.name),
        }
    }
}

impl Inventory {
    pub fn load(path: &Path) -> Result<Self, InventoryError> {
        let contents = fs::read_to_string(path).map_err(|source| InventoryError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&contents)
    }

    /// Parses inventory text; JSON is accepted since it is valid YAML.
    pub fn parse(contents: &str) -> Result<Self, InventoryError> {
        let instances = match serde_yaml::from_str(contents)? {
            InventoryDoc::Described { reservations } => reservations
                .into_iter()
                .flat_map(|r| r.instances)
                .map(Instance::from)
                .collect(),
            InventoryDoc::Listed { instances } | InventoryDoc::Bare(instances) => instances,
        };
        Ok(Self { instances })
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl InstanceLookup for Inventory {
    fn get_instances(&self, idstring: &str) -> anyhow::Result<Vec<Instance>> {
        let idstring = idstring.trim();
        Ok(self
            .instances
            .iter()
            .filter(|i| idstring.is_empty() || i.id == idstring)
            .cloned()
            .collect())
    }
}
