//! Case site catalog.
//!
//! Maps a case identifier (the value teams pick in "Case Site Bidding On") to
//! the free-text description handed verbatim to the reasoning service. The
//! catalog is built once at start-up and passed into the pipeline; nothing
//! mutates it during a run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::domain::{GraderError, Result};

/// Environment variable naming an optional TOML catalog file.
pub const CASES_FILE_ENV: &str = "SITETOX_CASES_FILE";

const BUILTIN_SITES: [(&str, &str); 6] = [
    (
        "Site 1",
        "Site 1: The Rocky Flats Plant was established in 1952 as part of the nuclear weapons \
         complex to manufacture nuclear weapons components under the jurisdiction and control of \
         DOE and its predecessor agencies. Manufacturing activities, accidental industrial fires, \
         spills, and support activities resulted in the release of hazardous constituents to air, \
         soil, sediment, groundwater, and surface water at the Rocky Flats Plant. Contaminants \
         released to the environment include the radionuclides plutonium, americium, and uranium \
         isotopes; organic solvents including trichloroethene, tetrachloroethene, and carbon \
         tetrachloride; metals such as chromium; and nitrates. Groundwater and landfills are of \
         concern.",
    ),
    (
        "Site 2",
        "Site 2: The Rocky Mountain Arsenal (RMA) is nearly 27 square miles, roughly the size of \
         Manhattan. RMA is located at the western edge of the Colorado plains, near the foothills \
         of the Rocky Mountains, ten miles northeast of downtown Denver, Colorado. The U.S. Army \
         established the RMA in 1942 to produce incendiary munitions and chemical warfare agents \
         such as mustard gas used in World War II. Following the war, and through the early \
         1980s, the Army continued to use these facilities. Private industry was also encouraged \
         to lease facilities at RMA after the war to foster economic growth in the area, offset \
         operational costs and maintain facilities for national security. Under the lease \
         program, Julius Hyman and Company began producing pesticides in 1946. In 1952, Shell \
         Chemical Company acquired Julius Hyman and Company and continued to produce agricultural \
         pesticides onsite until 1982. These activities over time resulted in widespread and \
         significant environmental contamination across the site. The primary contaminants \
         include organochloride pesticides, organophosphate pesticides, carbamate insecticides, \
         organic solvents and feedstock chemicals used as raw products or intermediates in the \
         manufacturing process (e.g., chlorinated benzenes), heavy metals, chemical warfare \
         material and their related breakdown products and biological warfare agent such as TX. \
         Additionally, ordnance (including incendiary munitions) was manufactured and tested, and \
         asbestos and polychlorinated biphenyls (PCBs) were used at RMA. Today, it is considered \
         a hazardous waste site according to the Colorado Department of Public and Environmental \
         Health. Groundwater is of particular concern.",
    ),
    (
        "Site 3",
        "Site 3: The 160-acre Marshall Landfill site consists of two adjacent 80-acre landfills. \
         The northern landfill is Marshall Landfill, and the southern landfill is Boulder \
         Landfill. Marshall Landfill began operating in 1965 as a solid waste composting and \
         disposal operation. Between 1969 and 1974, Marshall Landfill accepted municipal waste, \
         unstabilized sewage sludge, and many unknown, potentially hazardous, wastes. In 1974, \
         Boulder County discontinued use of Marshall Landfill when Boulder Landfill opened to the \
         immediate south. Boulder Landfill closed in January 1992. Sources of contamination \
         include areas of saturated refuse, waste disposal trenches, small areas where organic \
         solvents were disposed and two unlined leachate lagoons. Landfill operations \
         contaminated surface water and on-site shallow groundwater. Main compounds of concern: \
         Volatile organic compounds (VOCs), such as benzene, trichloroethylene (TCE) and \
         tetrachloroethylene (PCE). Heavy metals, such as barium, iron, manganese and zinc. Major \
         ions, such as chloride, nitrate and sulfate",
    ),
    (
        "Site 4",
        "Site 4: The Air Force Plant Peter J. Kiewit and Sons (PJKS) site is owned and operated \
         by Lockheed Martin Astronautics Operation. The plant is located 25 miles southwest of \
         Denver, near Waterton Canyon, Colorado. PJKS consists of 464 acres, and is surrounded by \
         another 4,700 acres of Lockheed Martin land. Company operations at PJKS include testing \
         Titan rockets, as well as designing, developing, testing and manufacturing advanced \
         technical systems for space and defense. Historical operations contaminated soil and \
         groundwater with hazardous chemicals. Following cleanup, operation and maintenance \
         activities are ongoing. Main contaminants of concern : TCE and NDMA in groundwater.",
    ),
    ("Site 5", "Solve algal blooms microbially."),
    (
        "Site 6",
        "The Alma WWTF wants to meet its ammonia discharge permits.",
    ),
];

/// Immutable identifier → description table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseCatalog {
    sites: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct CatalogFile {
    cases: BTreeMap<String, String>,
}

impl CaseCatalog {
    /// Empty catalog; every lookup fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// The six case sites of the bioremediation exercise.
    pub fn builtin() -> Self {
        BUILTIN_SITES
            .iter()
            .fold(Self::new(), |catalog, (id, description)| {
                catalog.with_site(*id, *description)
            })
    }

    pub fn with_site(mut self, id: impl Into<String>, description: impl Into<String>) -> Self {
        self.sites.insert(id.into(), description.into());
        self
    }

    /// Description for `case_id`, or [`GraderError::CaseNotFound`].
    pub fn describe(&self, case_id: &str) -> Result<&str> {
        self.sites
            .get(case_id)
            .map(String::as_str)
            .ok_or_else(|| GraderError::CaseNotFound(case_id.to_string()))
    }

    pub fn contains(&self, case_id: &str) -> bool {
        self.sites.contains_key(case_id)
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    /// Sites in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.sites.iter().map(|(id, d)| (id.as_str(), d.as_str()))
    }

    /// Parse a `[cases]` table of `"id" = "description"` pairs.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let file: CatalogFile =
            toml::from_str(raw).map_err(|e| GraderError::Catalog(e.to_string()))?;
        if let Some((id, _)) = file
            .cases
            .iter()
            .find(|(id, d)| id.trim().is_empty() || d.trim().is_empty())
        {
            return Err(GraderError::Catalog(format!(
                "case '{id}' has an empty identifier or description"
            )));
        }
        Ok(Self { sites: file.cases })
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&raw)
    }

    /// Load the file named by `SITETOX_CASES_FILE`, or fall back to
    /// [`CaseCatalog::builtin`] when the variable is unset.
    pub fn from_env_or_builtin() -> Result<Self> {
        match std::env::var(CASES_FILE_ENV) {
            Ok(path) if !path.trim().is_empty() => {
                let catalog = Self::from_toml_file(&path)?;
                info!(path = %path, cases = catalog.len(), "Loaded case catalog");
                Ok(catalog)
            }
            _ => Ok(Self::builtin()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_six_sites() {
        let catalog = CaseCatalog::builtin();
        assert_eq!(catalog.len(), 6);
        assert_eq!(
            catalog.describe("Site 5").unwrap(),
            "Solve algal blooms microbially."
        );
        assert!(catalog
            .describe("Site 1")
            .unwrap()
            .starts_with("Site 1: The Rocky Flats Plant"));
        assert!(catalog
            .describe("Site 3")
            .unwrap()
            .ends_with("chloride, nitrate and sulfate"));
    }

    #[test]
    fn test_unknown_case_is_not_found() {
        let err = CaseCatalog::builtin().describe("Site 9").unwrap_err();
        assert!(matches!(err, GraderError::CaseNotFound(ref id) if id == "Site 9"));
    }

    #[test]
    fn test_lookup_is_exact() {
        let catalog = CaseCatalog::builtin();
        assert!(!catalog.contains("site 1"));
        assert!(!catalog.contains("Site 1 "));
    }

    #[test]
    fn test_from_toml_str() {
        let catalog = CaseCatalog::from_toml_str(
            r#"
            [cases]
            "Pond A" = "Eutrophic pond with cyanobacteria."
            "Mine B" = "Acid mine drainage."
            "#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let ids: Vec<&str> = catalog.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec!["Mine B", "Pond A"]);
    }

    #[test]
    fn test_from_toml_rejects_empty_description() {
        let err = CaseCatalog::from_toml_str("[cases]\n\"Site 1\" = \"  \"\n").unwrap_err();
        assert!(matches!(err, GraderError::Catalog(_)));
    }

    #[test]
    fn test_from_toml_requires_cases_table() {
        let err = CaseCatalog::from_toml_str("title = \"no cases\"\n").unwrap_err();
        assert!(matches!(err, GraderError::Catalog(_)));
    }
}
