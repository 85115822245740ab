use serde::{Deserialize, Serialize};

/// Discriminator for every page type in the tree.
///
/// Placement constraints are expressed as data through
/// [`PageKind::allowed_parents`] rather than through inheritance, so the tree
/// can validate a child before it is attached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Home,
    About,
    Contact,
    BlogIndex,
    BlogPost,
    FaqIndex,
    FaqArticle,
    EncyclopediaIndex,
    EncyclopediaEntry,
    Strategy,
    StrategyList,
    Media,
    PriDdq,
    Legal,
    Compliance,
    Consultation,
    Guide,
    Criteria,
    Solutions,
    Advisor,
    Institutional,
    Onboarding,
}

impl PageKind {
    pub const fn label(self) -> &'static str {
        match self {
            PageKind::Home => "home",
            PageKind::About => "about",
            PageKind::Contact => "contact",
            PageKind::BlogIndex => "blog_index",
            PageKind::BlogPost => "blog_post",
            PageKind::FaqIndex => "faq_index",
            PageKind::FaqArticle => "faq_article",
            PageKind::EncyclopediaIndex => "encyclopedia_index",
            PageKind::EncyclopediaEntry => "encyclopedia_entry",
            PageKind::Strategy => "strategy",
            PageKind::StrategyList => "strategy_list",
            PageKind::Media => "media",
            PageKind::PriDdq => "pri_ddq",
            PageKind::Legal => "legal",
            PageKind::Compliance => "compliance",
            PageKind::Consultation => "consultation",
            PageKind::Guide => "guide",
            PageKind::Criteria => "criteria",
            PageKind::Solutions => "solutions",
            PageKind::Advisor => "advisor",
            PageKind::Institutional => "institutional",
            PageKind::Onboarding => "onboarding",
        }
    }

    /// Parent kinds this page type may be attached under, or `None` when the
    /// type is unrestricted (any page below the root).
    pub const fn allowed_parents(self) -> Option<&'static [PageKind]> {
        match self {
            PageKind::BlogPost => Some(&[PageKind::BlogIndex]),
            PageKind::FaqArticle => Some(&[PageKind::FaqIndex]),
            PageKind::EncyclopediaEntry => Some(&[PageKind::EncyclopediaIndex]),
            PageKind::Strategy => Some(&[PageKind::StrategyList, PageKind::Home]),
            _ => None,
        }
    }

    /// Index pages list their children rather than carrying body content of
    /// their own.
    pub const fn is_index(self) -> bool {
        matches!(
            self,
            PageKind::BlogIndex
                | PageKind::FaqIndex
                | PageKind::EncyclopediaIndex
                | PageKind::StrategyList
                | PageKind::Media
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_types_are_pinned_to_their_index() {
        assert_eq!(
            PageKind::BlogPost.allowed_parents(),
            Some(&[PageKind::BlogIndex][..])
        );
        assert_eq!(
            PageKind::FaqArticle.allowed_parents(),
            Some(&[PageKind::FaqIndex][..])
        );
        assert_eq!(
            PageKind::EncyclopediaEntry.allowed_parents(),
            Some(&[PageKind::EncyclopediaIndex][..])
        );
        assert!(PageKind::About.allowed_parents().is_none());
    }

    #[test]
    fn labels_are_stable() {
        assert_eq!(PageKind::PriDdq.label(), "pri_ddq");
        assert_eq!(PageKind::BlogIndex.label(), "blog_index");
    }
}
