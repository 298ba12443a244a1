//! 导出服务
//!
//! 把项目的有效输出（用户编辑版优先）渲染成 Markdown、HTML 或
//! Word 兼容的 HTML 文档。遍历顺序永远是框架注册表的固定顺序，
//! 没有输出的步骤直接跳过。

use rusqlite::Connection;

use toolthinker_core::database::dao::step_dao::StepDao;
use toolthinker_core::database::dao::step_output_dao::StepOutputDao;
use toolthinker_core::errors::domain_error::StepError;
use toolthinker_core::frameworks;
use toolthinker_core::models::project_model::Project;

// ============================================================================
// 格式
// ============================================================================

/// 导出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Markdown,
    Html,
    /// Word 打得开的 HTML（.doc）
    Doc,
}

impl ExportFormat {
    /// 从查询参数解析；未知值返回 None
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Some(Self::Markdown),
            "html" => Some(Self::Html),
            "doc" | "word" => Some(Self::Doc),
            _ => None,
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            Self::Markdown => "text/markdown; charset=utf-8",
            Self::Html => "text/html; charset=utf-8",
            Self::Doc => "application/msword",
        }
    }

    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
            Self::Doc => "doc",
        }
    }
}

/// 渲染好的导出文档
#[derive(Debug, Clone)]
pub struct ExportDocument {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

// ============================================================================
// 中间表示
// ============================================================================

/// 一个导出小节：框架标题 + 字段值
struct Section {
    title: &'static str,
    fields: Vec<(String, serde_json::Value)>,
}

/// 收集项目的导出小节，按框架固定顺序
///
/// 只收录已有输出的步骤；字段按框架 output_fields 的声明顺序，
/// 输出里多出的字段排在 schema 字段之后，缺失的字段跳过。
fn collect_sections(conn: &Connection, project_id: &str) -> Result<Vec<Section>, StepError> {
    let mut sections = Vec::new();
    for def in frameworks::all() {
        let Some(step) = StepDao::get_by_key(conn, project_id, def.key)? else {
            continue;
        };
        let Some(output) = StepOutputDao::get_by_step(conn, &step.id)? else {
            continue;
        };
        let effective = output.effective();
        let Some(obj) = effective.as_object() else {
            continue;
        };

        // schema 字段按声明顺序在前，输出里多出的字段跟在后面
        let mut fields: Vec<(String, serde_json::Value)> = def
            .output_fields
            .iter()
            .filter_map(|f| obj.get(*f).map(|v| (title_case(f), v.clone())))
            .collect();
        for (key, value) in obj {
            if !def.output_fields.contains(&key.as_str()) {
                fields.push((title_case(key), value.clone()));
            }
        }
        // 有持久化输出就有小节，空对象也渲染标题
        sections.push(Section {
            title: def.title,
            fields,
        });
    }
    Ok(sections)
}

/// snake_case 字段名转标题（"cost_structure" -> "Cost Structure"）
fn title_case(field: &str) -> String {
    field
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn value_as_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// 渲染
// ============================================================================

fn render_markdown(project: &Project, sections: &[Section]) -> String {
    let mut out = format!("# {}\n\n", project.name);
    if let Some(desc) = &project.description {
        if !desc.trim().is_empty() {
            out.push_str(&format!("{desc}\n\n"));
        }
    }
    for section in sections {
        out.push_str(&format!("## {}\n\n", section.title));
        for (title, value) in &section.fields {
            out.push_str(&format!("### {title}\n\n"));
            match value {
                serde_json::Value::Array(items) => {
                    for item in items {
                        out.push_str(&format!("- {}\n", value_as_text(item)));
                    }
                    out.push('\n');
                }
                other => {
                    out.push_str(&format!("{}\n\n", value_as_text(other)));
                }
            }
        }
    }
    out
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn render_html_body(project: &Project, sections: &[Section]) -> String {
    let mut out = format!("<h1>{}</h1>\n", html_escape(&project.name));
    if let Some(desc) = &project.description {
        if !desc.trim().is_empty() {
            out.push_str(&format!("<p>{}</p>\n", html_escape(desc)));
        }
    }
    for section in sections {
        out.push_str(&format!("<h2>{}</h2>\n", html_escape(section.title)));
        for (title, value) in &section.fields {
            out.push_str(&format!("<h3>{}</h3>\n", html_escape(title)));
            match value {
                serde_json::Value::Array(items) => {
                    out.push_str("<ul>\n");
                    for item in items {
                        out.push_str(&format!(
                            "<li>{}</li>\n",
                            html_escape(&value_as_text(item))
                        ));
                    }
                    out.push_str("</ul>\n");
                }
                other => {
                    let text = html_escape(&value_as_text(other)).replace('\n', "<br/>");
                    out.push_str(&format!("<p>{text}</p>\n"));
                }
            }
        }
    }
    out
}

fn render_html(project: &Project, sections: &[Section]) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\"/>\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape(&project.name),
        render_html_body(project, sections)
    )
}

fn render_doc(project: &Project, sections: &[Section]) -> String {
    // Word 认识带 office 命名空间的 HTML
    format!(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" xmlns:w=\"urn:schemas-microsoft-com:office:word\">\n<head>\n<meta charset=\"utf-8\"/>\n<title>{}</title>\n</head>\n<body>\n{}</body>\n</html>\n",
        html_escape(&project.name),
        render_html_body(project, sections)
    )
}

/// 导出安全的文件名：空白替换为下划线，去掉路径分隔符
fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    if cleaned.is_empty() {
        "project".to_string()
    } else {
        cleaned
    }
}

/// 导出项目
pub fn export_project(
    conn: &Connection,
    project: &Project,
    format: ExportFormat,
) -> Result<ExportDocument, StepError> {
    let sections = collect_sections(conn, &project.id)?;
    let body = match format {
        ExportFormat::Markdown => render_markdown(project, &sections),
        ExportFormat::Html => render_html(project, &sections),
        ExportFormat::Doc => render_doc(project, &sections),
    };
    Ok(ExportDocument {
        filename: format!(
            "{}.{}",
            sanitize_filename(&project.name),
            format.file_extension()
        ),
        content_type: format.content_type(),
        body,
    })
}

// ============================================================================
// 测试
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;
    use toolthinker_core::database::dao::project_dao::ProjectDao;
    use toolthinker_core::database::schema::create_tables;
    use toolthinker_core::models::project_model::CreateProjectRequest;

    fn setup_test_db() -> (Connection, Project) {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn.execute(
            "INSERT INTO users (id, email, password_hash, salt, created_at)
             VALUES ('u1', 'a@b.c', 'h', 's', 0)",
            [],
        )
        .unwrap();
        let project = ProjectDao::create(
            &conn,
            "u1",
            &CreateProjectRequest {
                name: "Lab Marketplace".to_string(),
                description: None,
                priority: None,
            },
        )
        .unwrap();
        (conn, project)
    }

    fn seed_output(conn: &Connection, project_id: &str, step_key: &str, output: serde_json::Value) {
        let step = StepDao::get_or_create(conn, project_id, step_key).unwrap();
        StepOutputDao::upsert_ai_output(conn, &step.id, &output).unwrap();
    }

    #[test]
    fn test_format_parse() {
        assert_eq!(ExportFormat::parse("markdown"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::parse("MD"), Some(ExportFormat::Markdown));
        assert_eq!(ExportFormat::parse("html"), Some(ExportFormat::Html));
        assert_eq!(ExportFormat::parse("word"), Some(ExportFormat::Doc));
        assert_eq!(ExportFormat::parse("pdf"), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("cost_structure"), "Cost Structure");
        assert_eq!(title_case("x"), "X");
        assert_eq!(title_case("problem"), "Problem");
    }

    #[test]
    fn test_markdown_skips_steps_without_output() {
        let (conn, project) = setup_test_db();
        seed_output(
            &conn,
            &project.id,
            "idea_refinement",
            json!({"problem_statement": "labs overpay for equipment"}),
        );
        // lean_canvas 步骤存在但没有输出
        StepDao::get_or_create(&conn, &project.id, "lean_canvas").unwrap();

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        assert!(doc.body.starts_with("# Lab Marketplace\n"));
        assert!(doc.body.contains("## Idea Refinement"));
        assert!(doc.body.contains("### Problem Statement"));
        assert!(doc.body.contains("labs overpay for equipment"));
        assert!(!doc.body.contains("Lean Canvas"));
    }

    #[test]
    fn test_markdown_renders_arrays_as_bullets() {
        let (conn, project) = setup_test_db();
        seed_output(
            &conn,
            &project.id,
            "idea_refinement",
            json!({
                "problem_statement": "p",
                "key_assumptions": ["labs own surplus gear", "buyers trust refurbished"]
            }),
        );

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        assert!(doc.body.contains("- labs own surplus gear\n"));
        assert!(doc.body.contains("- buyers trust refurbished\n"));
    }

    #[test]
    fn test_export_prefers_user_edited_output() {
        let (conn, project) = setup_test_db();
        let step = StepDao::get_or_create(&conn, &project.id, "idea_refinement").unwrap();
        StepOutputDao::upsert_ai_output(&conn, &step.id, &json!({"problem_statement": "ai words"}))
            .unwrap();
        StepOutputDao::set_user_edited(&conn, &step.id, &json!({"problem_statement": "my words"}))
            .unwrap();

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        assert!(doc.body.contains("my words"));
        assert!(!doc.body.contains("ai words"));
    }

    #[test]
    fn test_sections_follow_framework_order() {
        let (conn, project) = setup_test_db();
        // 乱序写入
        seed_output(&conn, &project.id, "lean_canvas", json!({"problem": "p"}));
        seed_output(
            &conn,
            &project.id,
            "idea_refinement",
            json!({"problem_statement": "s"}),
        );

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        let idea_pos = doc.body.find("## Idea Refinement").unwrap();
        let canvas_pos = doc.body.find("## Lean Canvas").unwrap();
        assert!(idea_pos < canvas_pos);
    }

    #[test]
    fn test_html_escapes_content() {
        let (conn, project) = setup_test_db();
        seed_output(
            &conn,
            &project.id,
            "idea_refinement",
            json!({"problem_statement": "<script>alert(1)</script>"}),
        );

        let doc = export_project(&conn, &project, ExportFormat::Html).unwrap();
        assert!(!doc.body.contains("<script>"));
        assert!(doc.body.contains("&lt;script&gt;"));
        assert_eq!(doc.content_type, "text/html; charset=utf-8");
    }

    #[test]
    fn test_doc_format_metadata() {
        let (conn, project) = setup_test_db();
        let doc = export_project(&conn, &project, ExportFormat::Doc).unwrap();
        assert_eq!(doc.content_type, "application/msword");
        assert_eq!(doc.filename, "Lab_Marketplace.doc");
        assert!(doc.body.contains("schemas-microsoft-com:office:word"));
    }

    #[test]
    fn test_extra_output_fields_still_rendered() {
        let (conn, project) = setup_test_db();
        seed_output(&conn, &project.id, "idea_refinement", json!({"x": "1"}));
        StepDao::get_or_create(&conn, &project.id, "target_customer").unwrap();

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        // 恰好一个小节，schema 外的字段也渲染
        assert_eq!(doc.body.matches("## ").count(), 1);
        assert!(doc.body.contains("### X\n\n1\n"));
    }

    #[test]
    fn test_empty_object_output_still_gets_section() {
        let (conn, project) = setup_test_db();
        seed_output(&conn, &project.id, "idea_refinement", json!({}));

        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        assert!(doc.body.contains("## Idea Refinement"));
        assert!(!doc.body.contains("### "));
    }

    #[test]
    fn test_empty_project_exports_title_only() {
        let (conn, project) = setup_test_db();
        let doc = export_project(&conn, &project, ExportFormat::Markdown).unwrap();
        assert_eq!(doc.body, "# Lab Marketplace\n\n");
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// 任意项目名清洗出的文件名非空且不含路径分隔符
        #[test]
        fn prop_sanitized_filename_is_safe(name in ".{0,64}") {
            let cleaned = sanitize_filename(&name);
            prop_assert!(!cleaned.is_empty());
            prop_assert!(!cleaned.contains('/'));
            prop_assert!(!cleaned.contains('\\'));
            prop_assert!(!cleaned.chars().any(char::is_whitespace));
        }

        /// HTML 转义后不残留裸尖括号
        #[test]
        fn prop_html_escape_removes_raw_angle_brackets(s in ".{0,64}") {
            let escaped = html_escape(&s);
            prop_assert!(!escaped.contains('<'));
            prop_assert!(!escaped.contains('>'));
        }
    }
}
