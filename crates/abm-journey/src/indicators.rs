//! Static indicator profiles for the five journey stages.

use abm_core::{ContentDepth, Stage};

/// Signals and engagement shape expected at one stage.
pub(crate) struct StageIndicators {
    pub stage: Stage,
    pub content: &'static [&'static str],
    pub behavior: &'static [&'static str],
    pub sales: &'static [&'static str],
    /// Expected interactions per day at this stage, inclusive.
    pub velocity_range: (f64, f64),
    pub expected_depth: ContentDepth,
}

/// Indicator profiles in journey order.
///
/// Tags follow the domain vocabulary: educational, first-touch signals
/// early; demo, pricing, and contract activity late; adoption and expansion
/// signals post-purchase.
pub(crate) const INDICATORS: [StageIndicators; 5] = [
    StageIndicators {
        stage: Stage::ProblemAwareness,
        content: &[
            "educational_content",
            "industry_trends",
            "blog_post_view",
            "thought_leadership",
        ],
        behavior: &["first_touch", "organic_search_visit", "newsletter_signup"],
        sales: &["cold_outreach_reply"],
        velocity_range: (0.0, 0.5),
        expected_depth: ContentDepth::Surface,
    },
    StageIndicators {
        stage: Stage::SolutionExploration,
        content: &[
            "whitepaper_download",
            "solution_overview_view",
            "webinar_attendance",
        ],
        behavior: &["return_visit", "multiple_page_session", "content_search"],
        sales: &["discovery_call_scheduled"],
        velocity_range: (0.3, 1.0),
        expected_depth: ContentDepth::Moderate,
    },
    StageIndicators {
        stage: Stage::VendorEvaluation,
        content: &[
            "case_study_view",
            "comparison_chart_view",
            "roi_calculator_use",
        ],
        behavior: &["pricing_page_visit", "demo_request", "repeat_product_visits"],
        sales: &[
            "demo_completed",
            "stakeholders_introduced",
            "technical_questions",
        ],
        velocity_range: (0.8, 2.0),
        expected_depth: ContentDepth::Comprehensive,
    },
    StageIndicators {
        stage: Stage::DecisionFinalization,
        content: &[
            "implementation_guide_view",
            "contract_template_download",
            "security_documentation",
        ],
        behavior: &["pricing_inquiry", "legal_review_request"],
        sales: &[
            "proposal_requested",
            "contract_negotiation",
            "references_requested",
        ],
        velocity_range: (1.0, 3.0),
        expected_depth: ContentDepth::Comprehensive,
    },
    StageIndicators {
        stage: Stage::PostPurchaseExpansion,
        content: &[
            "onboarding_content_view",
            "best_practices_view",
            "advanced_feature_content",
        ],
        behavior: &["product_login", "feature_adoption", "support_portal_visit"],
        sales: &[
            "renewal_discussion",
            "upsell_inquiry",
            "expansion_planning",
        ],
        velocity_range: (0.2, 1.5),
        expected_depth: ContentDepth::Moderate,
    },
];
