//! Keeps the public FAQ in step with the PRI due-diligence questionnaire.
//!
//! The canonical question/answer set lives here as data. Saving the DDQ page
//! stamps its display date and upserts one FAQ article per question, keyed by
//! exact title, so re-saving never duplicates articles. The sync is
//! best-effort: failures are logged and the page save still succeeds.

use chrono::Utc;
use tracing::{info, warn};

use crate::config::AppEnvironment;
use crate::content::fields::{FaqArticleFields, FaqCategory, PageBody, PriDdqFields};
use crate::content::kind::PageKind;
use crate::content::tree::{PageId, PageTree, TreeError};

pub const DDQ_FAQ_KEYWORDS: &str = "PRI DDQ responsible investment ESG";
pub const DDQ_FAQ_PRIORITY: i32 = 5;

#[derive(Debug, Clone, Copy)]
pub struct DdqQuestion {
    pub question: &'static str,
    pub answer: &'static str,
    pub category: FaqCategory,
}

/// The questionnaire answers the firm publishes, grouped as the PRI asks
/// them: investment approach, ESG integration, stewardship, reporting.
pub fn canonical_questions() -> &'static [DdqQuestion] {
    &[
        DdqQuestion {
            question: "What is your organisation's overall approach to responsible investment?",
            answer: "Ethical Capital exists to create industry-leading responsible investment \
                     strategies. Our mission is to align our clients' capital with companies \
                     that avoid preventable harm to living things and make meaningful \
                     contributions to a better future. We do this because we believe it leads \
                     to better client outcomes. The companies we exclude are generally \
                     lower-quality businesses, and our process benefits significantly from not \
                     having to engage with them in much depth.",
            category: FaqCategory::InvestmentApproach,
        },
        DdqQuestion {
            question: "Does your organisation have a responsible investment policy?",
            answer: "We do not segregate responsible investing from regular investing. All of \
                     our policy documents can be found on the process page of our website.",
            category: FaqCategory::InvestmentApproach,
        },
        DdqQuestion {
            question: "What international standards, industry guidelines, reporting frameworks, \
                       or initiatives has your organisation committed to?",
            answer: "We are signatories to the plant based treaty and work closely with the \
                     investor community whenever we can to advance our mission. As a matter of \
                     policy, we do not sign onto statements that require membership payments to \
                     the sponsoring body, only activist-led initiatives.",
            category: FaqCategory::InvestmentApproach,
        },
        DdqQuestion {
            question: "How is ESG materiality analysed for this strategy?",
            answer: "We focus on the degree to which a firm's revenue is directly associated \
                     with positive real-world outcomes. We do not use third-party tools, \
                     standards, or data to complete this analysis.",
            category: FaqCategory::EsgIntegration,
        },
        DdqQuestion {
            question: "How are financially material ESG factors incorporated into this strategy?",
            answer: "In the last twelve months: We exited a position in Eiffage SA (OTC:EFGSY) \
                     after uncovering evidence that the firm has failed to properly supervise \
                     some of its projects in the middle east, resulting in significant human \
                     rights challenges. We continued adding to our position in Badger Meter \
                     (NYSE:BMI) as their value-added water meters continued to add value to \
                     many municipal water systems. We re-entered our position in ELF cosmetics \
                     (NYSE:ELF) after a significant selloff in their stock price coincided with \
                     a stronger impact case and continued sales momentum.",
            category: FaqCategory::EsgIntegration,
        },
        DdqQuestion {
            question: "Does your organisation have a stewardship policy?",
            answer: "We do not have a stewardship policy at this time. Our firm has \
                     historically prioritised making its strategies accessible to all clients, \
                     regardless of how much money they have available to invest. This has \
                     required us to make certain trade-offs. One of the most material is that \
                     we are not currently able to vote our proxies.",
            category: FaqCategory::Stewardship,
        },
        DdqQuestion {
            question: "What information is disclosed in regular client reporting on the \
                       responsible investment activities and performance of this strategy?",
            answer: "We choose to emphasise firm-specific outcomes in our client reporting \
                     rather than ratings, carbon intensity, or other data. For instance, we \
                     devoted a section of our client letter to discussion of how one of our \
                     companies, a real estate investment trust, was able to preserve a historic \
                     mill as a center of commerce in a rural town.",
            category: FaqCategory::Reporting,
        },
        DdqQuestion {
            question: "How does your organisation audit the quality of its responsible \
                       investment processes and/or data?",
            answer: "We routinely look for third-party groups that credibly assess companies \
                     for their alignment with various indicators of sound corporate practice, \
                     and will routinely spot check our exclusions to ensure that we are \
                     adequately incorporating the latest and deepest analysis of companies \
                     implicated in objectionable behavior.",
            category: FaqCategory::Reporting,
        },
    ]
}

/// Upsert one FAQ article per canonical question, keyed by exact title.
/// Returns how many articles were created or updated. Never fails: a missing
/// FAQ index or a bad record is logged and skipped.
pub fn sync_to_faq(tree: &mut PageTree) -> usize {
    let Some(index) = tree
        .find_first(PageKind::FaqIndex)
        .filter(|node| node.live)
        .map(|node| node.id)
    else {
        warn!("no FAQ index page found, skipping DDQ sync");
        return 0;
    };

    let mut synced = 0;
    for question in canonical_questions() {
        let content = format!("<p>{}</p>", question.answer);
        let existing = tree
            .pages_of_kind(PageKind::FaqArticle)
            .into_iter()
            .find(|node| node.title == question.question)
            .map(|node| (node.id, node.body.clone()));

        let result = match existing {
            Some((id, PageBody::FaqArticle(mut fields))) => {
                if fields.content == content && fields.category == question.category {
                    continue;
                }
                fields.content = content;
                fields.category = question.category;
                tree.save(id, question.question, PageBody::FaqArticle(fields))
            }
            Some((id, _)) => {
                warn!(page = %id, "DDQ sync target is not an FAQ article, skipping");
                continue;
            }
            None => tree
                .add_child(
                    index,
                    question.question,
                    PageBody::FaqArticle(FaqArticleFields {
                        content,
                        category: question.category,
                        priority: DDQ_FAQ_PRIORITY,
                        keywords: DDQ_FAQ_KEYWORDS.to_string(),
                        ..Default::default()
                    }),
                )
                .and_then(|id| tree.publish(id)),
        };
        match result {
            Ok(()) => synced += 1,
            Err(err) => warn!(question = question.question, error = %err, "DDQ sync failed"),
        }
    }
    if synced > 0 {
        info!(synced, "DDQ questions synced to FAQ");
    }
    synced
}

/// Save the DDQ page: stamp the display date with the current UTC month and
/// year, persist, then sync the FAQ (skipped in the test environment).
pub fn save_ddq_page(
    tree: &mut PageTree,
    id: PageId,
    title: &str,
    mut fields: PriDdqFields,
    environment: AppEnvironment,
) -> Result<(), TreeError> {
    fields.updated_at = Utc::now().format("%B %Y").to_string();
    tree.save(id, title, PageBody::PriDdq(fields))?;
    tree.publish(id)?;
    if environment != AppEnvironment::Test {
        sync_to_faq(tree);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::queries;
    use crate::content::store::SiteContent;

    fn tree_with_ddq() -> (PageTree, PageId) {
        let mut content = SiteContent::bootstrap().expect("bootstrap");
        let root = content.tree.root().expect("root");
        let ddq = content
            .tree
            .add_child(root, "PRI DDQ", PageBody::PriDdq(PriDdqFields::default()))
            .expect("ddq page");
        (content.tree, ddq)
    }

    #[test]
    fn canonical_set_has_the_four_groups() {
        let questions = canonical_questions();
        assert_eq!(questions.len(), 8);
        let count = |category| {
            questions
                .iter()
                .filter(|q| q.category == category)
                .count()
        };
        assert_eq!(count(FaqCategory::InvestmentApproach), 3);
        assert_eq!(count(FaqCategory::EsgIntegration), 2);
        assert_eq!(count(FaqCategory::Stewardship), 1);
        assert_eq!(count(FaqCategory::Reporting), 2);
    }

    #[test]
    fn sync_creates_articles_with_priority_and_keywords() {
        let (mut tree, _) = tree_with_ddq();
        let synced = sync_to_faq(&mut tree);
        assert_eq!(synced, 8);

        let articles = queries::faq_articles(&tree);
        assert_eq!(articles.len(), 8);
        for (_, fields) in &articles {
            assert_eq!(fields.priority, DDQ_FAQ_PRIORITY);
            assert_eq!(fields.keywords, DDQ_FAQ_KEYWORDS);
            assert!(fields.content.starts_with("<p>"));
        }
    }

    #[test]
    fn sync_twice_is_a_no_op() {
        let (mut tree, _) = tree_with_ddq();
        assert_eq!(sync_to_faq(&mut tree), 8);
        assert_eq!(sync_to_faq(&mut tree), 0);
        assert_eq!(queries::faq_articles(&tree).len(), 8);
    }

    #[test]
    fn sync_overwrites_drifted_content() {
        let (mut tree, _) = tree_with_ddq();
        sync_to_faq(&mut tree);

        let question = canonical_questions()[0].question;
        let (id, mut fields) = {
            let (node, fields) =
                queries::faq_by_title(&tree, question).expect("article exists");
            (node.id, fields.clone())
        };
        fields.content = "<p>stale</p>".into();
        tree.save(id, question, PageBody::FaqArticle(fields)).expect("drift");

        assert_eq!(sync_to_faq(&mut tree), 1);
        let (_, fields) = queries::faq_by_title(&tree, question).expect("article exists");
        assert!(fields.content.contains("industry-leading"));
    }

    #[test]
    fn save_stamps_month_year_and_syncs() {
        let (mut tree, ddq) = tree_with_ddq();
        save_ddq_page(
            &mut tree,
            ddq,
            "PRI DDQ",
            PriDdqFields::default(),
            AppEnvironment::Development,
        )
        .expect("saves");

        let PageBody::PriDdq(fields) = &tree.node(ddq).expect("ddq").body else {
            unreachable!()
        };
        let expected = Utc::now().format("%B %Y").to_string();
        assert_eq!(fields.updated_at, expected);
        assert_eq!(queries::faq_articles(&tree).len(), 8);
    }

    #[test]
    fn save_in_test_environment_skips_the_sync() {
        let (mut tree, ddq) = tree_with_ddq();
        save_ddq_page(
            &mut tree,
            ddq,
            "PRI DDQ",
            PriDdqFields::default(),
            AppEnvironment::Test,
        )
        .expect("saves");
        assert!(queries::faq_articles(&tree).is_empty());
    }

    #[test]
    fn missing_faq_index_warns_and_succeeds() {
        let (mut tree, ddq) = tree_with_ddq();
        let faq = tree
            .find_first(PageKind::FaqIndex)
            .map(|node| node.id)
            .expect("faq index");
        tree.delete(faq).expect("delete");

        assert_eq!(sync_to_faq(&mut tree), 0);
        save_ddq_page(
            &mut tree,
            ddq,
            "PRI DDQ",
            PriDdqFields::default(),
            AppEnvironment::Production,
        )
        .expect("save still succeeds");
    }
}
