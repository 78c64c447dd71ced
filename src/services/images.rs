//! Display image lookup for vehicles.
//!
//! [`resolve`] is a pure table lookup used whenever a vehicle is saved without
//! an image. [`ImageResolver::auto_fetch`] backs the admin "auto-fetch" action
//! and may additionally query the Pexels and Unsplash search APIs.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::entities::vehicle::VehicleCategory;

const PEXELS_SEARCH_URL: &str = "https://api.pexels.com/v1/search";
const UNSPLASH_SEARCH_URL: &str = "https://api.unsplash.com/search/photos";

const FALLBACK_ECO: &str = "https://images.pexels.com/photos/116675/pexels-photo-116675.jpeg";
const FALLBACK_SUV: &str = "https://images.pexels.com/photos/1335077/pexels-photo-1335077.jpeg";
const FALLBACK_CONVERTIBLE: &str =
    "https://images.pexels.com/photos/1719648/pexels-photo-1719648.jpeg";
const FALLBACK_SPORTS: &str = "https://images.pexels.com/photos/1545743/pexels-photo-1545743.jpeg";
const FALLBACK_LUXURY: &str = "https://images.pexels.com/photos/1592384/pexels-photo-1592384.jpeg";
const FALLBACK_SEDAN: &str = "https://images.pexels.com/photos/1149137/pexels-photo-1149137.jpeg";

const NEXON: &str = "https://images.pexels.com/photos/3802510/pexels-photo-3802510.jpeg";
const NEXON_EV: &str = "https://images.pexels.com/photos/7144176/pexels-photo-7144176.jpeg";

/// Curated model name -> image. Keys are lowercase.
static CATALOG: &[(&str, &str)] = &[
    ("tata nexon", NEXON),
    ("tata nexon ev", NEXON_EV),
    ("tata safari", FALLBACK_SUV),
    ("tata harrier", FALLBACK_SPORTS),
    ("tata altroz", FALLBACK_SEDAN),
    ("maruti suzuki swift", FALLBACK_ECO),
    ("maruti suzuki dzire", FALLBACK_LUXURY),
    ("maruti suzuki baleno", FALLBACK_CONVERTIBLE),
    ("maruti suzuki vitara brezza", FALLBACK_SUV),
    ("maruti suzuki s-presso", FALLBACK_SEDAN),
    ("hyundai creta", FALLBACK_SPORTS),
    ("hyundai verna", FALLBACK_LUXURY),
    ("hyundai i20", FALLBACK_ECO),
    ("hyundai venue", FALLBACK_SUV),
    ("hyundai grand i10 nios", FALLBACK_SEDAN),
    ("mahindra thar", FALLBACK_SUV),
    ("mahindra xuv700", FALLBACK_SPORTS),
    ("mahindra scorpio", FALLBACK_SUV),
    ("mahindra bolero", FALLBACK_SUV),
    ("honda city", FALLBACK_LUXURY),
    ("honda amaze", FALLBACK_SEDAN),
    ("honda jazz", FALLBACK_ECO),
    ("honda wr-v", FALLBACK_SUV),
    ("toyota innova crysta", FALLBACK_SPORTS),
    ("toyota fortuner", FALLBACK_SUV),
    ("toyota camry", FALLBACK_LUXURY),
    ("toyota glanza", FALLBACK_ECO),
    ("bmw 3 series", FALLBACK_LUXURY),
    ("bmw 5 series", FALLBACK_LUXURY),
    ("bmw 7 series", FALLBACK_LUXURY),
    ("bmw x1", FALLBACK_SUV),
    ("bmw x3", FALLBACK_SUV),
    ("bmw z4", FALLBACK_CONVERTIBLE),
    ("bmw m3", FALLBACK_SPORTS),
    ("mercedes-benz c-class", FALLBACK_LUXURY),
    ("mercedes-benz e-class", FALLBACK_LUXURY),
    ("mercedes-benz s-class", FALLBACK_LUXURY),
    ("mercedes-benz glc", FALLBACK_SUV),
    ("mercedes-benz gle", FALLBACK_SUV),
    ("audi a3", FALLBACK_LUXURY),
    ("audi a4", FALLBACK_LUXURY),
    ("audi a6", FALLBACK_LUXURY),
    ("audi a8", FALLBACK_LUXURY),
    ("audi q3", FALLBACK_SUV),
    ("audi q5", FALLBACK_SUV),
    ("audi a3 cabriolet", FALLBACK_CONVERTIBLE),
    ("ford mustang", FALLBACK_SPORTS),
    ("chevrolet camaro", FALLBACK_SPORTS),
    ("dodge challenger", FALLBACK_SPORTS),
    ("porsche 911", FALLBACK_SPORTS),
    ("lamborghini huracan", FALLBACK_SPORTS),
    ("ferrari 488", FALLBACK_SPORTS),
];

/// Brand aliases that give the image search APIs better results.
static BRAND_ALIASES: &[(&str, &str)] = &[
    ("tata", "tata motors"),
    ("maruti", "maruti suzuki"),
    ("mercedes", "mercedes benz"),
];

/// Fallback image for a category name. Unknown categories get the sedan image.
pub fn fallback_for(category: &str) -> &'static str {
    match category.trim().to_lowercase().as_str() {
        "eco" => FALLBACK_ECO,
        "suv" => FALLBACK_SUV,
        "convertible" => FALLBACK_CONVERTIBLE,
        "sports" => FALLBACK_SPORTS,
        "luxury" => FALLBACK_LUXURY,
        _ => FALLBACK_SEDAN,
    }
}

/// Looks `name` up in the curated table only, without any fallback.
pub fn lookup(name: &str) -> Option<&'static str> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }

    // Keys found inside the name: the longest is the most specific model.
    let within_name = CATALOG
        .iter()
        .filter(|(key, _)| name.contains(key))
        .max_by_key(|(key, _)| key.len());
    if let Some((_, url)) = within_name {
        return Some(*url);
    }

    // Name found inside a key: the shortest key is the closest model.
    let around_name = CATALOG
        .iter()
        .filter(|(key, _)| key.contains(name.as_str()))
        .min_by_key(|(key, _)| key.len());
    if let Some((_, url)) = around_name {
        return Some(*url);
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    CATALOG
        .iter()
        .find(|(key, _)| {
            let matched = words
                .iter()
                .filter(|word| key.split_whitespace().any(|key_word| key_word.contains(*word)))
                .count();
            matched >= 2
        })
        .map(|(_, url)| *url)
}

/// Table lookup with the category fallback chain.
pub fn resolve(name: &str, category: &str) -> &'static str {
    lookup(name).unwrap_or_else(|| fallback_for(category))
}

/// Query sent to the image search APIs, e.g. "tata motors nexon car".
pub fn search_query(name: &str) -> String {
    let name = name.trim().to_lowercase();
    let mut words = name.split_whitespace();
    let Some(brand) = words.next() else {
        return "car".to_string();
    };

    let brand = BRAND_ALIASES
        .iter()
        .find(|(alias, _)| *alias == brand)
        .map(|(_, full)| *full)
        .unwrap_or(brand);
    let model: Vec<&str> = words.collect();

    if model.is_empty() {
        format!("{} car", brand)
    } else {
        format!("{} {} car", brand, model.join(" "))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageSource {
    Catalog,
    Pexels,
    Unsplash,
    Fallback,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolvedImage {
    pub image_url: String,
    pub source: ImageSource,
}

#[derive(Deserialize)]
struct PexelsResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Deserialize)]
struct PexelsPhoto {
    src: PexelsSrc,
}

#[derive(Deserialize)]
struct PexelsSrc {
    large: String,
}

#[derive(Deserialize)]
struct UnsplashResponse {
    #[serde(default)]
    results: Vec<UnsplashPhoto>,
}

#[derive(Deserialize)]
struct UnsplashPhoto {
    urls: UnsplashUrls,
}

#[derive(Deserialize)]
struct UnsplashUrls {
    regular: String,
}

/// Best-effort image lookup for the admin console.
#[derive(Clone)]
pub struct ImageResolver {
    client: reqwest::Client,
    pexels_api_key: Option<String>,
    unsplash_access_key: Option<String>,
}

impl ImageResolver {
    pub fn new(config: &Config) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.image_fetch_timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            pexels_api_key: config.pexels_api_key.clone(),
            unsplash_access_key: config.unsplash_access_key.clone(),
        }
    }

    /// Resolver that never leaves the curated table.
    #[cfg(test)]
    fn offline() -> Self {
        Self {
            client: reqwest::Client::new(),
            pexels_api_key: None,
            unsplash_access_key: None,
        }
    }

    /// Curated table first, then Pexels, then Unsplash, then the category
    /// fallback. Search failures are logged and skipped, never returned.
    pub async fn auto_fetch(&self, name: &str, category: VehicleCategory) -> ResolvedImage {
        if let Some(url) = lookup(name) {
            return ResolvedImage {
                image_url: url.to_string(),
                source: ImageSource::Catalog,
            };
        }

        let query = search_query(name);

        if let Some(key) = &self.pexels_api_key {
            match self.search_pexels(&query, key).await {
                Ok(Some(url)) => {
                    return ResolvedImage {
                        image_url: url,
                        source: ImageSource::Pexels,
                    };
                }
                Ok(None) => tracing::debug!(query = %query, "Pexels returned no photos"),
                Err(e) => tracing::warn!(query = %query, error = %e, "Pexels search failed"),
            }
        }

        if let Some(key) = &self.unsplash_access_key {
            match self.search_unsplash(&query, key).await {
                Ok(Some(url)) => {
                    return ResolvedImage {
                        image_url: url,
                        source: ImageSource::Unsplash,
                    };
                }
                Ok(None) => tracing::debug!(query = %query, "Unsplash returned no photos"),
                Err(e) => tracing::warn!(query = %query, error = %e, "Unsplash search failed"),
            }
        }

        ResolvedImage {
            image_url: fallback_for(category.as_str()).to_string(),
            source: ImageSource::Fallback,
        }
    }

    async fn search_pexels(&self, query: &str, key: &str) -> reqwest::Result<Option<String>> {
        let response: PexelsResponse = self
            .client
            .get(PEXELS_SEARCH_URL)
            .header(reqwest::header::AUTHORIZATION, key)
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.photos.into_iter().next().map(|p| p.src.large))
    }

    async fn search_unsplash(&self, query: &str, key: &str) -> reqwest::Result<Option<String>> {
        let response: UnsplashResponse = self
            .client
            .get(UNSPLASH_SEARCH_URL)
            .header(reqwest::header::AUTHORIZATION, format!("Client-ID {}", key))
            .query(&[("query", query), ("per_page", "1"), ("orientation", "landscape")])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response.results.into_iter().next().map(|p| p.urls.regular))
    }
}
