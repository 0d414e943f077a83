use crate::core::config::SiteConfig;

/// Host and locale of the public product site.
///
/// Both the verifier and the link builders derive product URLs from here, so a
/// verified identifier always links to the exact page that was probed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSite {
    host: String,
    locale: String,
}

impl ProductSite {
    pub fn new(host: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            locale: locale.into(),
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// `https://{host}/{locale}/product-detail/{identifier}`
    pub fn product_url(&self, identifier: &str) -> String {
        format!(
            "https://{}/{}/product-detail/{}",
            self.host,
            self.locale,
            urlencoding::encode(identifier)
        )
    }
}

impl From<&SiteConfig> for ProductSite {
    fn from(config: &SiteConfig) -> Self {
        Self::new(config.host.trim(), config.locale.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_canonical_product_url() {
        let site = ProductSite::new("www.kyocera-unimerco.com", "en-dk");
        assert_eq!(
            site.product_url("W381195-2125412"),
            "https://www.kyocera-unimerco.com/en-dk/product-detail/W381195-2125412"
        );
    }

    #[test]
    fn encodes_identifier_as_single_path_segment() {
        let site = ProductSite::new("host", "locale");
        assert_eq!(
            site.product_url("A B/1"),
            "https://host/locale/product-detail/A%20B%2F1"
        );
    }
}
