//! Static catalog of defense-in-depth layers.
//!
//! The catalog is built once at startup and never mutated. Layers are handed out
//! as `Arc<DefenseLayer>` so the controller can hold a reference to the exact
//! catalog entry that is selected.

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;

/// One ring of the defense-in-depth model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefenseLayer {
    pub id: String,
    pub name: String,
    pub description: String,
    /// Illustrative bullet points. Never replaced by generated output.
    pub details: Vec<String>,
    /// Presentation color as `#rrggbb`.
    pub color: String,
    /// Presentation radius; larger is further out.
    pub radius: u16,
}

impl DefenseLayer {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        details: &[&str],
        color: &str,
        radius: u16,
    ) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            details: details.iter().map(|d| d.to_string()).collect(),
            color: color.to_string(),
            radius,
        }
    }

    /// Parse the `#rrggbb` color into components.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let hex = self.color.strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some((r, g, b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("duplicate layer id: {0}")]
    DuplicateId(String),
}

#[derive(Debug, Clone)]
pub struct LayerCatalog {
    layers: Vec<Arc<DefenseLayer>>,
}

impl LayerCatalog {
    /// Build a catalog, rejecting repeated ids.
    pub fn new(layers: Vec<DefenseLayer>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for layer in &layers {
            if !seen.insert(layer.id.as_str()) {
                return Err(CatalogError::DuplicateId(layer.id.clone()));
            }
        }

        Ok(Self {
            layers: layers.into_iter().map(Arc::new).collect(),
        })
    }

    /// The seven-layer model, innermost (data) first.
    pub fn defense_in_depth() -> Result<Self, CatalogError> {
        let layers = vec![
            DefenseLayer::new(
                "data",
                "Data",
                "Controls access to business and customer data. Often, regulatory requirements dictate the controls to ensure data confidentiality, integrity, and availability.",
                &[
                    "Stored in a database.",
                    "Stored on disk inside virtual machines.",
                    "Stored in SaaS applications.",
                    "Managed through cloud storage.",
                ],
                "#ffffff",
                50,
            ),
            DefenseLayer::new(
                "application",
                "Application",
                "Helps ensure that applications are secure and free of security vulnerabilities.",
                &[
                    "Ensure applications are secure and free of vulnerabilities.",
                    "Store sensitive application secrets in a secure storage medium.",
                    "Make security a design requirement for all application development.",
                ],
                "#bae6fd",
                90,
            ),
            DefenseLayer::new(
                "compute",
                "Compute",
                "Secures access to virtual machines and helps minimize security issues from malware or unpatched systems.",
                &[
                    "Secure access to virtual machines.",
                    "Implement endpoint protection on devices.",
                    "Keep systems patched and current.",
                ],
                "#7dd3fc",
                130,
            ),
            DefenseLayer::new(
                "network",
                "Network",
                "Limits communication between resources through segmentation and access controls to reduce risk of attack spread.",
                &[
                    "Limit communication between resources.",
                    "Deny by default.",
                    "Restrict inbound internet access and limit outbound access.",
                    "Implement secure connectivity to on-premises networks.",
                ],
                "#38bdf8",
                170,
            ),
            DefenseLayer::new(
                "perimeter",
                "Perimeter",
                "Uses DDoS protection and firewalls to filter large-scale attacks before they can cause a denial of service for users.",
                &[
                    "Use DDoS protection to filter large-scale attacks.",
                    "Use perimeter firewalls to identify and alert on malicious attacks.",
                ],
                "#0ea5e9",
                210,
            ),
            DefenseLayer::new(
                "identity",
                "Identity & Access",
                "Controls access to infrastructure and change control, ensuring identities are secure and access is logged.",
                &[
                    "Control access to infrastructure and change control.",
                    "Use single sign-on (SSO) and multifactor authentication.",
                    "Audit events and changes.",
                ],
                "#0284c7",
                250,
            ),
            DefenseLayer::new(
                "physical",
                "Physical Security",
                "The first line of defense to protect computing hardware in the datacenter.",
                &[
                    "Physically secure access to buildings.",
                    "Control access to computing hardware within the datacenter.",
                ],
                "#0369a1",
                290,
            ),
        ];

        Self::new(layers)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Arc<DefenseLayer>> {
        self.layers.iter()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, index: usize) -> Option<&Arc<DefenseLayer>> {
        self.layers.get(index)
    }

    /// Index of a layer in this catalog's order.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.layers.iter().position(|l| l.id == id)
    }

    /// Resolve a layer by id. Absent ids are not an error.
    pub fn lookup(&self, id: &str) -> Option<Arc<DefenseLayer>> {
        self.layers.iter().find(|l| l.id == id).cloned()
    }

    /// The same layers reordered from the outermost ring inwards.
    pub fn rings_outside_in(&self) -> LayerCatalog {
        let mut layers = self.layers.clone();
        layers.sort_by(|a, b| b.radius.cmp(&a.radius));
        LayerCatalog { layers }
    }
}
