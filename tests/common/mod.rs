//! Helpers shared by the integration tests
#![allow(dead_code)]

use cv_pipeline::config::Config;
use cv_pipeline::error::Result;
use cv_pipeline::llm::{AgentRequest, AgentResponse, AgentRole, LanguageModel};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};

type Responder = Box<dyn Fn(&AgentRequest) -> Result<String> + Send + Sync>;

/// A language model that answers from a closure and records every request
pub struct ScriptedModel {
    responder: Responder,
    calls: Arc<Mutex<Vec<AgentRequest>>>,
}

impl ScriptedModel {
    pub fn new(responder: impl Fn(&AgentRequest) -> Result<String> + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Profiles named after the first resume line; one match per known candidate
    pub fn standard() -> Self {
        Self::new(|request| {
            Ok(match request.role {
                AgentRole::ProfileBuilder => profile_reply(&request.prompt),
                AgentRole::JobMatcher => MATCH_REPLY.to_string(),
            })
        })
    }

    /// Shared handle on the recorded requests, usable after the model is moved
    pub fn calls(&self) -> Arc<Mutex<Vec<AgentRequest>>> {
        Arc::clone(&self.calls)
    }
}

impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &AgentRequest) -> Result<AgentResponse> {
        self.calls.lock().unwrap().push(request.clone());
        (self.responder)(request).map(AgentResponse::text)
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub fn count_calls(calls: &Arc<Mutex<Vec<AgentRequest>>>, role: AgentRole) -> usize {
    calls.lock().unwrap().iter().filter(|r| r.role == role).count()
}

pub const MATCH_REPLY: &str = r#"Here is my assessment:
{
  "matches": [
    {"candidate": "Bob Jones", "job_id": "backend", "score": 72, "rank": 2, "justification": "Go experience"},
    {"candidate": "Alice Smith", "job_id": "backend", "score": "high", "rank": 1, "justification": "5 years Python"}
  ],
  "summary": "Alice Smith is the strongest backend candidate."
}"#;

/// Fenced reply naming the candidate after the resume's first line, up to a comma
fn profile_reply(prompt: &str) -> String {
    let first_line = prompt
        .split_once("\">\n")
        .map(|(_, rest)| rest.lines().next().unwrap_or_default())
        .unwrap_or_default();
    let name = first_line.split(',').next().unwrap_or_default().trim();

    format!(
        "```json\n{}\n```",
        serde_json::json!({
            "name": name,
            "skills": ["Python", "Go"],
            "years_experience": 5,
            "seniority": "mid-level"
        })
    )
}

/// Write a PDF with one Courier text line per page. An empty string yields
/// a page without text.
pub fn write_pdf(path: &Path, pages: &[&str]) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Courier",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::new();
    for text in pages {
        let operations = if text.is_empty() {
            Vec::new()
        } else {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(*text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

/// CMap mapping two-byte codes 1..=5 to "Alice"
const ALICE_TO_UNICODE: &str = "/CIDInit /ProcSet findresource begin
12 dict begin
begincmap
/CIDSystemInfo << /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def
/CMapName /Adobe-Identity-UCS def
/CMapType 2 def
1 begincodespacerange
<0000> <FFFF>
endcodespacerange
5 beginbfchar
<0001> <0041>
<0002> <006C>
<0003> <0069>
<0004> <0063>
<0005> <0065>
endbfchar
endcmap
CMapName currentdict /CIDInit /ProcSet findresource pop end
end
";

/// Write a one-page PDF whose only text is "Alice" in a Type0 font with
/// Identity-H encoding, readable only through its ToUnicode map.
pub fn write_identity_h_pdf(path: &Path) {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let descriptor_id = doc.add_object(dictionary! {
        "Type" => "FontDescriptor",
        "FontName" => "AliceSans",
        "Flags" => 4,
        "FontBBox" => vec![0.into(), (-200).into(), 1000.into(), 900.into()],
        "ItalicAngle" => 0,
        "Ascent" => 900,
        "Descent" => -200,
        "CapHeight" => 700,
        "StemV" => 80,
    });
    let cid_font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "CIDFontType2",
        "BaseFont" => "AliceSans",
        "CIDSystemInfo" => dictionary! {
            "Registry" => Object::string_literal("Adobe"),
            "Ordering" => Object::string_literal("Identity"),
            "Supplement" => 0,
        },
        "FontDescriptor" => descriptor_id,
        "DW" => 600,
        "CIDToGIDMap" => "Identity",
    });
    let to_unicode_id = doc.add_object(Stream::new(dictionary! {}, ALICE_TO_UNICODE.as_bytes().to_vec()));
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type0",
        "BaseFont" => "AliceSans",
        "Encoding" => "Identity-H",
        "DescendantFonts" => vec![cid_font_id.into()],
        "ToUnicode" => to_unicode_id,
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => font_id,
        },
    });

    let content = Content {
        operations: vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(vec![0, 1, 0, 2, 0, 3, 0, 4, 0, 5], StringFormat::Hexadecimal)],
            ),
            Operation::new("ET", vec![]),
        ],
    };
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    doc.save(path).unwrap();
}

/// Config whose stage directories live under `root`, with progress bars off
pub fn config_rooted_at(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths = config.paths.rooted_at(root);
    config.output.show_progress = false;
    config
}

pub fn write_backend_job(root: &Path) {
    let knowledge = root.join("knowledge");
    fs::create_dir_all(&knowledge).unwrap();
    fs::write(
        knowledge.join("backend.json"),
        r#"{
  "title": "Backend Engineer",
  "company": "Acme",
  "required_skills": ["Python", "PostgreSQL"],
  "min_years_experience": 3
}"#,
    )
    .unwrap();
}
