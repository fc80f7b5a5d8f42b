//! Declarative transaction templates.
//!
//! A template describes one entry of the transaction graph: the value it
//! carries, how many inputs and outputs it has, and the scripts of its
//! explicit outputs. Output scripts use the compact prototype form
//!
//! ```text
//! { "o0": "OP_0", "o1": "OP_RETURN", "s2": "Hello Bitcoin Simulator" }
//! ```
//!
//! where the key prefix is the chunk kind (`o` opcode, `s` UTF-8 text push,
//! `h` hex push) and the suffix its position in the script.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::graph::GraphError;

/// Text pushed by the default prototype output.
pub const DEFAULT_MESSAGE: &str = "Hello Bitcoin Simulator";

/// One chunk of an output script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptChunk {
    /// Opcode by name, e.g. `OP_RETURN`.
    Op(String),
    /// Data push of UTF-8 text.
    Text(String),
    /// Data push of hex-encoded bytes.
    Hex(String),
}

impl ScriptChunk {
    fn prefix(&self) -> char {
        match self {
            Self::Op(_) => 'o',
            Self::Text(_) => 's',
            Self::Hex(_) => 'h',
        }
    }

    fn value(&self) -> &str {
        match self {
            Self::Op(v) | Self::Text(v) | Self::Hex(v) => v,
        }
    }
}

/// An ordered output script built from prototype chunks.
///
/// In JSON each chunk is keyed by kind and position (`o0`, `s1`, `h2`).
/// Positions only order the chunks: gaps are dropped on parse and chunks
/// are renumbered from 0 when written back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct OutputScript {
    chunks: Vec<ScriptChunk>,
}

impl OutputScript {
    pub fn new(chunks: Vec<ScriptChunk>) -> Result<Self, GraphError> {
        if chunks.is_empty() {
            return Err(GraphError::InvalidTemplate("output script has no chunks".to_string()));
        }
        for chunk in &chunks {
            match chunk {
                ScriptChunk::Op(name) if !name.starts_with("OP_") => {
                    return Err(GraphError::InvalidTemplate(format!(
                        "'{}' is not an opcode name",
                        name
                    )));
                }
                ScriptChunk::Hex(data) if hex::decode(data).is_err() => {
                    return Err(GraphError::InvalidTemplate(format!("'{}' is not hex", data)));
                }
                _ => {}
            }
        }
        Ok(Self { chunks })
    }

    /// The default `OP_0 OP_RETURN "Hello Bitcoin Simulator"` data carrier.
    pub fn default_prototype() -> Self {
        Self {
            chunks: vec![
                ScriptChunk::Op("OP_0".to_string()),
                ScriptChunk::Op("OP_RETURN".to_string()),
                ScriptChunk::Text(DEFAULT_MESSAGE.to_string()),
            ],
        }
    }

    pub fn chunks(&self) -> &[ScriptChunk] {
        &self.chunks
    }
}

impl fmt::Display for OutputScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, chunk) in self.chunks.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match chunk {
                ScriptChunk::Op(name) => f.write_str(name)?,
                ScriptChunk::Text(text) => write!(f, "{:?}", text)?,
                ScriptChunk::Hex(data) => write!(f, "0x{}", data)?,
            }
        }
        Ok(())
    }
}

impl TryFrom<BTreeMap<String, String>> for OutputScript {
    type Error = GraphError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut indexed = BTreeMap::new();
        for (key, value) in map {
            let mut chars = key.chars();
            let kind = chars.next();
            let index: usize = chars.as_str().parse().map_err(|_| {
                GraphError::InvalidTemplate(format!("bad chunk key '{}'", key))
            })?;
            let chunk = match kind {
                Some('o') => ScriptChunk::Op(value),
                Some('s') => ScriptChunk::Text(value),
                Some('h') => ScriptChunk::Hex(value),
                _ => {
                    return Err(GraphError::InvalidTemplate(format!(
                        "unknown chunk kind in '{}'",
                        key
                    )))
                }
            };
            if indexed.insert(index, chunk).is_some() {
                return Err(GraphError::InvalidTemplate(format!(
                    "duplicate chunk position {}",
                    index
                )));
            }
        }
        Self::new(indexed.into_values().collect())
    }
}

/// Keys are renumbered densely from 0.
impl From<OutputScript> for BTreeMap<String, String> {
    fn from(script: OutputScript) -> Self {
        script
            .chunks
            .into_iter()
            .enumerate()
            .map(|(i, chunk)| (format!("{}{}", chunk.prefix(), i), chunk.value().to_string()))
            .collect()
    }
}

/// Number of inputs and outputs of a graph entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    #[serde(rename = "in")]
    pub inputs: u32,
    #[serde(rename = "out")]
    pub outputs: u32,
}

/// One entry to append to the transaction graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxTemplate {
    #[serde(rename = "v")]
    pub value: u64,
    pub edge: Edge,
    #[serde(rename = "out")]
    pub outputs: Vec<OutputScript>,
}

impl TxTemplate {
    /// Single-output prototype: `v = 1`, one input, two outputs, one data carrier.
    pub fn default_prototype() -> Self {
        Self::with_outputs(vec![OutputScript::default_prototype()])
    }

    /// Template with the default value and edges around custom output scripts.
    pub fn with_outputs(outputs: Vec<OutputScript>) -> Self {
        Self {
            value: 1,
            edge: Edge {
                inputs: 1,
                outputs: 2,
            },
            outputs,
        }
    }

    /// Parse a template from JSON.
    ///
    /// Accepts either a full template object or a bare list of output
    /// script prototypes, which gets the default value and edges.
    pub fn from_json(raw: &str) -> Result<Self, GraphError> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Full(TxTemplate),
            Outputs(Vec<OutputScript>),
        }

        let template = match serde_json::from_str::<Input>(raw)
            .map_err(|e| GraphError::InvalidTemplate(e.to_string()))?
        {
            Input::Full(template) => template,
            Input::Outputs(outputs) => Self::with_outputs(outputs),
        };
        template.validate()?;
        Ok(template)
    }

    pub fn validate(&self) -> Result<(), GraphError> {
        if self.edge.inputs == 0 {
            return Err(GraphError::InvalidTemplate("entry needs at least one input".to_string()));
        }
        if self.outputs.is_empty() {
            return Err(GraphError::InvalidTemplate("entry has no output scripts".to_string()));
        }
        if (self.edge.outputs as usize) < self.outputs.len() {
            return Err(GraphError::InvalidTemplate(format!(
                "{} output scripts exceed {} outputs",
                self.outputs.len(),
                self.edge.outputs
            )));
        }
        Ok(())
    }
}

impl Default for TxTemplate {
    fn default() -> Self {
        Self::default_prototype()
    }
}
