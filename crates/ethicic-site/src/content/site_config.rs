//! Per-site singleton configuration: identity, contact block, navigation,
//! SEO defaults, and the user-facing form messages.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationMenuItem {
    pub label: String,
    pub url: String,
    /// Links off-site; rendered with a new-tab hint.
    pub external: bool,
    pub sort_order: i32,
    pub show_in_nav: bool,
    pub show_in_footer: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfiguration {
    pub company_name: String,
    pub tagline: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub contact_address: String,
    pub linkedin_url: String,
    pub twitter_handle: String,
    pub seo_title_suffix: String,
    pub seo_default_description: String,
    pub copyright_text: String,
    pub regulatory_disclosure: String,
    pub contact_success_message: String,
    pub contact_error_message: String,
    pub navigation: Vec<NavigationMenuItem>,
}

impl Default for SiteConfiguration {
    fn default() -> Self {
        Self {
            company_name: "Ethical Capital".into(),
            tagline: "Concentrated ethical portfolios".into(),
            contact_email: "hello@ethicic.com".into(),
            contact_phone: String::new(),
            contact_address: String::new(),
            linkedin_url: String::new(),
            twitter_handle: String::new(),
            seo_title_suffix: " | Ethical Capital".into(),
            seo_default_description: String::new(),
            copyright_text: "© Ethical Capital. All rights reserved.".into(),
            regulatory_disclosure: String::new(),
            contact_success_message: "Thank you for your message! We will get back to you \
                                      within 24 hours."
                .into(),
            contact_error_message: "There was an error sending your message. Please try again \
                                    or email us directly."
                .into(),
            navigation: Vec::new(),
        }
    }
}

impl SiteConfiguration {
    /// Navigation entries visible in the header, in sort order.
    pub fn nav_items(&self) -> Vec<&NavigationMenuItem> {
        self.visible(|item| item.show_in_nav)
    }

    /// Navigation entries visible in the footer, in sort order.
    pub fn footer_items(&self) -> Vec<&NavigationMenuItem> {
        self.visible(|item| item.show_in_footer)
    }

    fn visible(&self, keep: impl Fn(&NavigationMenuItem) -> bool) -> Vec<&NavigationMenuItem> {
        let mut items: Vec<&NavigationMenuItem> =
            self.navigation.iter().filter(|item| keep(item)).collect();
        items.sort_by_key(|item| item.sort_order);
        items
    }
}
