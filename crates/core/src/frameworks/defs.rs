//! 框架定义清单
//!
//! 固定有序的创业规划工作流。顺序即导出、复制、对比时的遍历顺序，
//! 调整顺序属于破坏性变更。

use super::{FrameworkDef, Question};

/// 固定顺序的框架定义
pub static FRAMEWORKS: &[FrameworkDef] = &[
    FrameworkDef {
        key: "idea_refinement",
        title: "Idea Refinement",
        description: "sharpen the core idea into one clear problem statement and solution",
        questions: &[
            Question {
                id: "idea",
                label: "Describe your startup idea in a few sentences",
                required: true,
            },
            Question {
                id: "problem",
                label: "What problem does it solve?",
                required: true,
            },
            Question {
                id: "inspiration",
                label: "What inspired this idea?",
                required: false,
            },
        ],
        output_fields: &["problem_statement", "solution_summary", "key_assumptions"],
    },
    FrameworkDef {
        key: "target_customer",
        title: "Target Customer",
        description: "identify the early adopter segment and their current alternatives",
        questions: &[
            Question {
                id: "customer",
                label: "Who do you think your customer is?",
                required: true,
            },
            Question {
                id: "current_solution",
                label: "How do they solve the problem today?",
                required: true,
            },
            Question {
                id: "willingness_to_pay",
                label: "Why would they pay for your solution?",
                required: false,
            },
        ],
        output_fields: &["segments", "early_adopter_profile", "pains", "gains"],
    },
    FrameworkDef {
        key: "value_proposition",
        title: "Value Proposition",
        description: "articulate the unique value in the customer's language",
        questions: &[
            Question {
                id: "benefit",
                label: "What is the single biggest benefit you deliver?",
                required: true,
            },
            Question {
                id: "differentiator",
                label: "What makes you different from existing options?",
                required: true,
            },
        ],
        output_fields: &["value_statement", "differentiators", "proof_points"],
    },
    FrameworkDef {
        key: "lean_canvas",
        title: "Lean Canvas",
        description: "compress the business into the nine lean canvas blocks",
        questions: &[
            Question {
                id: "revenue_idea",
                label: "How do you plan to make money?",
                required: true,
            },
            Question {
                id: "channels",
                label: "How will you reach customers?",
                required: true,
            },
            Question {
                id: "costs",
                label: "What are your main costs?",
                required: false,
            },
        ],
        output_fields: &[
            "problem",
            "solution",
            "unique_value_proposition",
            "customer_segments",
            "channels",
            "revenue_streams",
            "cost_structure",
            "key_metrics",
            "unfair_advantage",
        ],
    },
    FrameworkDef {
        key: "market_analysis",
        title: "Market Analysis",
        description: "size the market and identify the entry wedge",
        questions: &[
            Question {
                id: "market",
                label: "Which market are you entering?",
                required: true,
            },
            Question {
                id: "geography",
                label: "Where will you launch first?",
                required: false,
            },
            Question {
                id: "trends",
                label: "What trends make this the right time?",
                required: false,
            },
        ],
        output_fields: &["market_size", "target_segment", "entry_strategy", "risks"],
    },
    FrameworkDef {
        key: "competitor_scan",
        title: "Competitor Scan",
        description: "map direct and indirect competitors and your positioning",
        questions: &[
            Question {
                id: "competitors",
                label: "Which competitors are you aware of?",
                required: true,
            },
            Question {
                id: "positioning",
                label: "How will you position against them?",
                required: false,
            },
        ],
        output_fields: &[
            "direct_competitors",
            "indirect_competitors",
            "positioning",
            "moat",
        ],
    },
    FrameworkDef {
        key: "business_model",
        title: "Business Model",
        description: "define pricing, unit economics and the path to repeatable revenue",
        questions: &[
            Question {
                id: "pricing",
                label: "What pricing model do you have in mind?",
                required: true,
            },
            Question {
                id: "unit",
                label: "What is one unit of your product or service?",
                required: true,
            },
        ],
        output_fields: &[
            "pricing_model",
            "unit_economics",
            "revenue_projection",
            "milestones",
        ],
    },
    FrameworkDef {
        key: "pitch_outline",
        title: "Pitch Outline",
        description: "assemble the previous steps into a ten-slide pitch outline",
        questions: &[
            Question {
                id: "audience",
                label: "Who is the pitch for (investors, partners, accelerator)?",
                required: true,
            },
            Question {
                id: "ask",
                label: "What is your ask?",
                required: true,
            },
        ],
        output_fields: &["slides", "opening_hook", "closing_ask"],
    },
];
