//! Decoder configuration.

use crate::common::DEFAULT_BEAM_WIDTH;
use crate::errors::{Result, TremoloError};

/// Options recognized by the decoders and the feature templates.
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    pub(crate) beam_width: usize,
    pub(crate) feature_order: u8,
    pub(crate) use_global_features: bool,
    pub(crate) skip_null_role_features: bool,
    pub(crate) grow_alphabets: bool,
    pub(crate) score_unknown_features: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            beam_width: DEFAULT_BEAM_WIDTH,
            feature_order: 1,
            use_global_features: true,
            skip_null_role_features: false,
            grow_alphabets: false,
            score_unknown_features: false,
        }
    }
}

impl DecoderConfig {
    /// Changes the beam width of the joint decoder. Must be at least 1.
    ///
    /// The default value is 4.
    pub const fn beam_width(mut self, width: usize) -> Self {
        self.beam_width = width;
        self
    }

    /// Changes the feature order: 0 generates unigram node templates, 1 or
    /// higher generates bigram templates.
    ///
    /// The default value is 1.
    pub const fn feature_order(mut self, order: u8) -> Self {
        self.feature_order = order;
        self
    }

    /// Changes whether features over the shape of the partial assignment
    /// are generated. Only the joint discipline can use them.
    ///
    /// Enabled by default.
    pub const fn use_global_features(mut self, yes: bool) -> Self {
        self.use_global_features = yes;
        self
    }

    /// Changes whether edge assignments carrying the null role fire no
    /// features.
    ///
    /// Disabled by default.
    pub const fn skip_null_role_features(mut self, yes: bool) -> Self {
        self.skip_null_role_features = yes;
        self
    }

    /// Changes whether unknown labels and features may still be interned at
    /// decode time. Leave unset to decode under a frozen model.
    ///
    /// Disabled by default.
    pub const fn grow_alphabets(mut self, yes: bool) -> Self {
        self.grow_alphabets = yes;
        self
    }

    /// Changes whether out-of-vocabulary features are still scored with
    /// unit weight instead of being dropped.
    ///
    /// Disabled by default.
    pub const fn score_unknown_features(mut self, yes: bool) -> Self {
        self.score_unknown_features = yes;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.beam_width == 0 {
            return Err(TremoloError::invalid_argument(
                "beam_width",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setters() {
        let config = DecoderConfig::default()
            .beam_width(8)
            .feature_order(0)
            .use_global_features(false);
        assert_eq!(config.beam_width, 8);
        assert_eq!(config.feature_order, 0);
        assert!(!config.use_global_features);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_beam_width_is_rejected() {
        assert!(DecoderConfig::default().beam_width(0).validate().is_err());
    }
}
