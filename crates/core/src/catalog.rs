use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use crate::error::CatalogError;
use crate::models::{Poi, PoiCategory};

#[derive(Debug, Deserialize)]
struct CatalogFile {
    pois: Vec<Poi>,
}

/// Immutable POI catalog. Iteration order is insertion order.
#[derive(Debug, Clone, Default)]
pub struct PoiStore {
    pois: Vec<Poi>,
    by_name: HashMap<String, usize>,
    by_keyword: HashMap<String, usize>,
}

impl PoiStore {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(pois: Vec<Poi>) -> Result<Self, CatalogError> {
        let mut by_name = HashMap::with_capacity(pois.len());
        let mut by_keyword = HashMap::new();

        for (idx, poi) in pois.iter().enumerate() {
            if !poi.coordinates.is_valid() {
                return Err(CatalogError::InvalidCoordinates {
                    name: poi.name.clone(),
                });
            }
            if by_name.insert(poi.name.clone(), idx).is_some() {
                return Err(CatalogError::DuplicateName(poi.name.clone()));
            }
            for keyword in &poi.keywords {
                // first POI to claim an alias keeps it
                by_keyword.entry(keyword.clone()).or_insert(idx);
            }
        }

        Ok(Self {
            pois,
            by_name,
            by_keyword,
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(raw)?;
        Self::new(file.pois)
    }

    pub fn lookup(&self, name: &str) -> Option<&Poi> {
        self.by_name.get(name).map(|idx| &self.pois[*idx])
    }

    pub fn lookup_by_keyword(&self, token: &str) -> Option<&Poi> {
        self.by_keyword.get(token).map(|idx| &self.pois[*idx])
    }

    pub fn all(&self) -> &[Poi] {
        &self.pois
    }

    pub fn len(&self) -> usize {
        self.pois.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pois.is_empty()
    }

    pub fn coastal(&self) -> Vec<&Poi> {
        self.pois.iter().filter(|poi| poi.is_coastal()).collect()
    }

    /// Every POI name and alias paired with the canonical name it resolves to.
    pub fn location_terms(&self) -> Vec<(&str, &str)> {
        let mut seen = HashSet::new();
        let mut terms = Vec::new();

        for poi in &self.pois {
            if seen.insert(poi.name.as_str()) {
                terms.push((poi.name.as_str(), poi.name.as_str()));
            }
        }
        for poi in &self.pois {
            for keyword in &poi.keywords {
                if seen.insert(keyword.as_str()) {
                    let canonical = self
                        .lookup_by_keyword(keyword)
                        .map(|owner| owner.name.as_str())
                        .unwrap_or(poi.name.as_str());
                    terms.push((keyword.as_str(), canonical));
                }
            }
        }

        terms
    }

    pub fn search(&self, category: Option<PoiCategory>, query: Option<&str>) -> Vec<&Poi> {
        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        self.pois
            .iter()
            .filter(|poi| category.map_or(true, |wanted| poi.category == wanted))
            .filter(|poi| {
                query.as_deref().map_or(true, |q| {
                    poi.name.to_lowercase().contains(q)
                        || poi.keywords.iter().any(|k| k.to_lowercase().contains(q))
                })
            })
            .collect()
    }
}
