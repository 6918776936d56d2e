//! Gemini model definitions and registry.
//!
//! The analysis agent needs a model that accepts video input and can use the
//! `google_search` tool. This module lists the models known to work and
//! resolves short aliases to canonical identifiers.

use serde::Serialize;

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Gemini model definition for video analysis.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct GeminiModel {
    /// Full model identifier
    pub id: &'static str,
    /// Model aliases for convenience
    #[serde(skip)]
    pub aliases: &'static [&'static str],
    /// Human-readable name shown in the page header
    pub display_name: &'static str,
}

// =============================================================================
// Static Model Definitions
// =============================================================================

/// Gemini 2.0 Flash experimental
pub const GEMINI_2_0_FLASH_EXP: GeminiModel = GeminiModel {
    id: "gemini-2.0-flash-exp",
    aliases: &["gemini-flash-exp", "gemini-2-flash-exp"],
    display_name: "Gemini 2.0 Flash Exp",
};

/// Gemini 2.0 Flash
pub const GEMINI_2_0_FLASH: GeminiModel = GeminiModel {
    id: "gemini-2.0-flash",
    aliases: &["gemini-2-flash"],
    display_name: "Gemini 2.0 Flash",
};

/// Gemini 2.5 Flash
pub const GEMINI_2_5_FLASH: GeminiModel = GeminiModel {
    id: "gemini-2.5-flash",
    aliases: &["gemini-flash", "gemini-2.5-flash-latest"],
    display_name: "Gemini 2.5 Flash",
};

/// Gemini 2.5 Pro
pub const GEMINI_2_5_PRO: GeminiModel = GeminiModel {
    id: "gemini-2.5-pro",
    aliases: &["gemini-pro", "gemini-2.5-pro-latest"],
    display_name: "Gemini 2.5 Pro",
};

/// All known Gemini models
pub const GEMINI_MODELS: &[GeminiModel] = &[
    GEMINI_2_0_FLASH_EXP,
    GEMINI_2_0_FLASH,
    GEMINI_2_5_FLASH,
    GEMINI_2_5_PRO,
];

// =============================================================================
// Model Registry
// =============================================================================

/// Model registry for resolution and listing.
pub struct ModelRegistry;

impl ModelRegistry {
    /// Resolve a Gemini model name or alias to full model definition.
    ///
    /// # Examples
    ///
    /// ```
    /// use video_insight_common::models::ModelRegistry;
    ///
    /// let model = ModelRegistry::resolve_gemini("gemini-flash-exp").unwrap();
    /// assert_eq!(model.id, "gemini-2.0-flash-exp");
    ///
    /// assert!(ModelRegistry::resolve_gemini("not-a-model").is_none());
    /// ```
    pub fn resolve_gemini(name: &str) -> Option<&'static GeminiModel> {
        let name = name.trim();
        GEMINI_MODELS
            .iter()
            .find(|model| model.id == name || model.aliases.contains(&name))
    }

    /// List all known Gemini models.
    pub fn list_gemini_models() -> &'static [GeminiModel] {
        GEMINI_MODELS
    }

    /// Comma-separated canonical ids, for diagnostics.
    pub fn known_ids() -> String {
        Self::list_gemini_models()
            .iter()
            .map(|model| model.id)
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Human-readable label for a model identifier.
    ///
    /// Falls back to the identifier itself for models outside the registry.
    pub fn display_name(id: &str) -> &str {
        match Self::resolve_gemini(id) {
            Some(model) => model.display_name,
            None => id,
        }
    }
}
