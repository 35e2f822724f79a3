//! Route table.
//!
//! Maps storefront paths to typed [`Route`]s and back. Path matching is exact
//! apart from a trailing slash; unknown paths resolve to [`Route::NotFound`]
//! (the "coming soon" page) rather than an error.

use std::fmt;

use navdana_core::{CategoryId, ProductId, Role};
use url::form_urlencoded;

/// Static information pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InfoPage {
    About,
    Faqs,
    TermsConditions,
    ShippingPolicy,
    OurTeam,
    Contact,
    ReturnsExchanges,
    PrivacyPolicy,
    Blog,
    CancelPolicy,
    ReturnExchangeRequest,
    Career,
}

impl InfoPage {
    /// Every info page, in footer order.
    pub const ALL: [Self; 12] = [
        Self::About,
        Self::Faqs,
        Self::TermsConditions,
        Self::ShippingPolicy,
        Self::OurTeam,
        Self::Contact,
        Self::ReturnsExchanges,
        Self::PrivacyPolicy,
        Self::Blog,
        Self::CancelPolicy,
        Self::ReturnExchangeRequest,
        Self::Career,
    ];

    /// Path segment of the page.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::About => "about",
            Self::Faqs => "faqs",
            Self::TermsConditions => "terms-conditions",
            // Published links use this spelling.
            Self::ShippingPolicy => "shiping-policy",
            Self::OurTeam => "our-team",
            Self::Contact => "contact",
            Self::ReturnsExchanges => "returns-exchanges",
            Self::PrivacyPolicy => "privacy-policy",
            Self::Blog => "blog",
            Self::CancelPolicy => "cancel-policy",
            Self::ReturnExchangeRequest => "return-exchange-request",
            Self::Career => "career",
        }
    }

    /// Page heading.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::About => "About Us",
            Self::Faqs => "FAQs",
            Self::TermsConditions => "Terms & Conditions",
            Self::ShippingPolicy => "Shipping Policy",
            Self::OurTeam => "Our Team",
            Self::Contact => "Contact Us",
            Self::ReturnsExchanges => "Returns & Exchanges",
            Self::PrivacyPolicy => "Privacy Policy",
            Self::Blog => "Blog",
            Self::CancelPolicy => "Cancellation Policy",
            Self::ReturnExchangeRequest => "Return / Exchange Request",
            Self::Career => "Careers",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|page| page.slug() == slug)
    }
}

/// Admin dashboard sections under `/dashboard`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardSection {
    Overview,
    Reports,
    Settings,
    Category,
    Product,
    Banners,
    Users,
    Orders,
    Blog,
    ContactDetails,
    Subscribe,
}

impl DashboardSection {
    /// Every section, in sidebar order.
    pub const ALL: [Self; 11] = [
        Self::Overview,
        Self::Reports,
        Self::Settings,
        Self::Category,
        Self::Product,
        Self::Banners,
        Self::Users,
        Self::Orders,
        Self::Blog,
        Self::ContactDetails,
        Self::Subscribe,
    ];

    /// Path segment after `/dashboard/`; empty for the overview.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Overview => "",
            Self::Reports => "reports",
            Self::Settings => "settings",
            Self::Category => "category",
            Self::Product => "product",
            Self::Banners => "banners",
            Self::Users => "users",
            Self::Orders => "orders",
            Self::Blog => "blog",
            Self::ContactDetails => "contact-details",
            Self::Subscribe => "subscribe",
        }
    }

    fn from_slug(slug: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|section| section.slug() == slug)
    }
}

/// A resolved storefront location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Info(InfoPage),
    Product(ProductId),
    AllProducts,
    Cart,
    Collection(CategoryId),
    Search { keyword: String },
    MyOrders,
    Dashboard(DashboardSection),
    /// Anything unrecognised; rendered as the "coming soon" page.
    NotFound(String),
}

impl Route {
    /// Resolve a path, optionally carrying a query string.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let (path, query) = input.split_once('?').unwrap_or((input, ""));
        let trimmed = path.trim_matches('/');
        let segments: Vec<&str> = if trimmed.is_empty() {
            Vec::new()
        } else {
            trimmed.split('/').collect()
        };

        match segments.as_slice() {
            [] => Self::Home,
            ["product", id] if !id.is_empty() => Self::Product(ProductId::new(*id)),
            ["all-products"] => Self::AllProducts,
            ["cart"] => Self::Cart,
            ["collection-pages", id] if !id.is_empty() => {
                Self::Collection(CategoryId::new(*id))
            }
            ["search"] => Self::Search {
                keyword: query_value(query, "keyword").unwrap_or_default(),
            },
            ["my-orders"] => Self::MyOrders,
            ["dashboard"] => Self::Dashboard(DashboardSection::Overview),
            ["dashboard", section] => DashboardSection::from_slug(section)
                .filter(|s| *s != DashboardSection::Overview)
                .map_or_else(|| Self::NotFound(path.to_string()), Self::Dashboard),
            [slug] => InfoPage::from_slug(slug)
                .map_or_else(|| Self::NotFound(path.to_string()), Self::Info),
            _ => Self::NotFound(path.to_string()),
        }
    }

    /// Canonical path for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Info(page) => format!("/{}", page.slug()),
            Self::Product(id) => format!("/product/{id}"),
            Self::AllProducts => "/all-products".to_string(),
            Self::Cart => "/cart".to_string(),
            Self::Collection(id) => format!("/collection-pages/{id}"),
            Self::Search { keyword } => {
                let query: String = form_urlencoded::Serializer::new(String::new())
                    .append_pair("keyword", keyword)
                    .finish();
                format!("/search?{query}")
            }
            Self::MyOrders => "/my-orders".to_string(),
            Self::Dashboard(DashboardSection::Overview) => "/dashboard".to_string(),
            Self::Dashboard(section) => format!("/dashboard/{}", section.slug()),
            Self::NotFound(path) => path.clone(),
        }
    }

    /// Role a user must hold to view this route, if any.
    #[must_use]
    pub const fn required_role(&self) -> Option<Role> {
        match self {
            Self::Dashboard(_) => Some(Role::Admin),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

fn query_value(query: &str, key: &str) -> Option<String> {
    form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_catalog_routes() {
        assert_eq!(Route::parse("/"), Route::Home);
        assert_eq!(Route::parse(""), Route::Home);
        assert_eq!(
            Route::parse("/product/66a1f"),
            Route::Product(ProductId::new("66a1f"))
        );
        assert_eq!(Route::parse("/all-products/"), Route::AllProducts);
        assert_eq!(
            Route::parse("/collection-pages/c9"),
            Route::Collection(CategoryId::new("c9"))
        );
        assert_eq!(Route::parse("/cart"), Route::Cart);
        assert_eq!(Route::parse("/my-orders"), Route::MyOrders);
    }

    #[test]
    fn test_parse_search_keyword() {
        assert_eq!(
            Route::parse("/search?keyword=silk+saree"),
            Route::Search {
                keyword: "silk saree".to_string()
            }
        );
        assert_eq!(
            Route::parse("/search"),
            Route::Search {
                keyword: String::new()
            }
        );
    }

    #[test]
    fn test_parse_info_pages() {
        assert_eq!(
            Route::parse("/shiping-policy"),
            Route::Info(InfoPage::ShippingPolicy)
        );
        for page in InfoPage::ALL {
            assert_eq!(Route::parse(&Route::Info(page).path()), Route::Info(page));
        }
    }

    #[test]
    fn test_dashboard_routes_require_admin() {
        assert_eq!(
            Route::parse("/dashboard"),
            Route::Dashboard(DashboardSection::Overview)
        );
        for section in DashboardSection::ALL {
            let route = Route::Dashboard(section);
            assert_eq!(Route::parse(&route.path()), route);
            assert_eq!(route.required_role(), Some(Role::Admin));
        }
        assert_eq!(Route::Cart.required_role(), None);
    }

    #[test]
    fn test_unknown_paths_are_not_found() {
        assert_eq!(
            Route::parse("/dashboard/payroll"),
            Route::NotFound("/dashboard/payroll".to_string())
        );
        assert_eq!(
            Route::parse("/product"),
            Route::NotFound("/product".to_string())
        );
        assert!(matches!(Route::parse("/a/b/c"), Route::NotFound(_)));
    }

    #[test]
    fn test_search_path_encodes_keyword() {
        let route = Route::Search {
            keyword: "red & gold".to_string(),
        };
        assert_eq!(route.path(), "/search?keyword=red+%26+gold");
        assert_eq!(Route::parse(&route.path()), route);
    }
}
