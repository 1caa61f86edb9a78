// Prompt builders for the four tools.
// Reuses cross-cutting fragments from llm_client::prompts.

use serde::{Deserialize, Serialize};

use crate::llm_client::prompts::{
    HEADING_INSTRUCTION, NO_PLACEHOLDERS_INSTRUCTION, RAW_HTML_INSTRUCTION,
};
use crate::session::Profile;

// ────────────────────────────────────────────────────────────────────────────
// Resume styles
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeStyle {
    #[default]
    Minimalist,
    Structured,
    Chronological,
}

pub struct StyleEntry {
    pub style: ResumeStyle,
    pub label: &'static str,
    pub instruction: &'static str,
}

pub static RESUME_STYLES: [StyleEntry; 3] = [
    StyleEntry {
        style: ResumeStyle::Minimalist,
        label: "Minimalist Clean (ATS Friendly)",
        instruction: "STRICT FORMAT: Minimalist (Linear).
1. Header: Name (Bold), Role, Contact Info (in one line if possible).
2. Summary: 2-3 lines max.
3. Education: University, Degree, Year (Clean list).
4. Projects: Project Name | Tech Stack | Date. Bullet points for results.
5. Skills: Categorized list (e.g., Languages, Tools).
NO complex tables. Clean, scannable text.",
    },
    StyleEntry {
        style: ResumeStyle::Structured,
        label: "Structured Professional (Project Focused)",
        instruction: "STRICT FORMAT: Structured (Emphasis on Projects).
1. Header.
2. Professional Summary.
3. Projects: DETAILED. Use \"Project Name | Tech Stack\" as header. 3 bullet points per project emphasizing numbers/results.
4. Technical Skills: Grouped clearly.
5. Education.
6. Languages/Interests (Short).",
    },
    StyleEntry {
        style: ResumeStyle::Chronological,
        label: "Chronological (Experience Focused)",
        instruction: "Standard Chronological format. Experience first, then Projects.",
    },
];

impl ResumeStyle {
    pub fn entry(self) -> &'static StyleEntry {
        match self {
            ResumeStyle::Minimalist => &RESUME_STYLES[0],
            ResumeStyle::Structured => &RESUME_STYLES[1],
            ResumeStyle::Chronological => &RESUME_STYLES[2],
        }
    }

    pub fn label(self) -> &'static str {
        self.entry().label
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Builders
// ────────────────────────────────────────────────────────────────────────────

pub fn resume_prompt(profile: &Profile, style: ResumeStyle) -> String {
    let base = format!(
        "Write a professional resume for {name}, applying for a {role} position.
Contact: {email}, {phone}, LinkedIn: {linkedin}, GitHub: {github}
TECHNICAL SKILLS: {skills}
WORK EXPERIENCE: {experience}
PROJECT EXPERIENCE: {projects}
EDUCATION: {education}",
        name = profile.name,
        role = profile.role,
        email = profile.email,
        phone = profile.phone,
        linkedin = profile.linkedin,
        github = profile.github,
        skills = profile.skills,
        experience = profile.experience,
        projects = profile.projects,
        education = profile.education,
    );
    format!("{base}\n{}\n{HEADING_INSTRUCTION}", style.entry().instruction)
}

pub fn portfolio_cards_prompt(raw_projects: &str) -> String {
    format!(
        r#"Convert these project descriptions into clean HTML <div> cards.
Input Projects: {raw_projects}

Output format for EACH project:
<div class="project-card">
    <h3>Project Name</h3>
    <p>Short description...</p>
    <div class="tech-stack">Tech: Python, SQL (Example)</div>
</div>

{RAW_HTML_INSTRUCTION}"#
    )
}

pub fn cover_letter_prompt(name: &str, company: &str, role: &str, job_description: &str) -> String {
    format!(
        "Write a professional cover letter for {name} to {company} for the role of {role}.
JOB DESCRIPTION: {job_description}

STRICT RULES:
1. Tone: Professional, enthusiastic, and confident.
2. {NO_PLACEHOLDERS_INSTRUCTION}
3. Use strictly the information provided. If a detail (like address) is missing, do not include that line.
4. Sign off with the user's actual name: {name}."
    )
}

pub fn ats_feedback_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        "Analyze this resume against the JD.
Resume: {resume_text}
JD: {job_description}
Provide: 1. Missing Keywords 2. Improvement Tips."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_table_covers_every_style() {
        for entry in &RESUME_STYLES {
            assert_eq!(entry.style.entry().label, entry.label);
        }
        assert_eq!(ResumeStyle::default(), ResumeStyle::Minimalist);
    }

    #[test]
    fn test_resume_prompt_ends_with_style_and_heading_instruction() {
        let profile = Profile {
            name: "Jane Doe".into(),
            role: "Data Engineer".into(),
            skills: "Python, SQL".into(),
            ..Profile::default()
        };
        let prompt = resume_prompt(&profile, ResumeStyle::Chronological);
        assert!(prompt.starts_with(
            "Write a professional resume for Jane Doe, applying for a Data Engineer position."
        ));
        assert!(prompt.contains("TECHNICAL SKILLS: Python, SQL"));
        assert!(prompt.ends_with(
            "EDUCATION: \nStandard Chronological format. Experience first, then Projects.\nEnsure clear headings using ## for sections."
        ));
    }

    #[test]
    fn test_cover_letter_prompt_signs_off_with_name() {
        let prompt = cover_letter_prompt("Jane Doe", "Acme", "SRE", "Run prod.");
        assert!(prompt.contains("to Acme for the role of SRE"));
        assert!(prompt.ends_with("Sign off with the user's actual name: Jane Doe."));
        assert!(prompt.contains("[Your Name]"));
    }

    #[test]
    fn test_portfolio_prompt_asks_for_raw_html() {
        let prompt = portfolio_cards_prompt("Ledger: a Rust bookkeeping tool");
        assert!(prompt.contains("Input Projects: Ledger: a Rust bookkeeping tool"));
        assert!(prompt.ends_with(RAW_HTML_INSTRUCTION));
    }

    #[test]
    fn test_style_serde_names() {
        let style: ResumeStyle = serde_json::from_str("\"structured\"").unwrap();
        assert_eq!(style, ResumeStyle::Structured);
        assert_eq!(style.label(), "Structured Professional (Project Focused)");
    }
}
