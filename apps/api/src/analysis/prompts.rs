// Résumé analysis LLM prompt templates.
// The schema below is the contract `AnalyzedRecord` deserializes from.

pub const RESUME_ANALYSIS_SYSTEM: &str = "\
You are an expert resume analyzer. \
Extract key information from resume text into a single structured JSON object. \
Never invent information that is not present in the resume text.";

pub const RESUME_ANALYSIS_PROMPT: &str = r#"Extract key information from the provided resume text and return it as a structured JSON object.
The JSON object should conform to the following TypeScript-style interface structure:

interface ContactInfo {
  email?: string;
  phone?: string;
  linkedin?: string;
  github?: string;
  portfolio?: string;
  address?: string;
}

interface ExperienceEntry {
  jobTitle: string; // e.g., "Software Engineer"
  company: string; // e.g., "Google"
  location?: string; // e.g., "Mountain View, CA"
  dates: string; // e.g., "Jan 2020 - Present" or "2018 - 2019"
  responsibilities: string[]; // Concise accomplishments or duties.
}

interface EducationEntry {
  degree: string; // e.g., "B.S. in Computer Science"
  institution: string; // e.g., "Stanford University"
  location?: string;
  graduationDate: string; // e.g., "May 2018" or "Expected Dec 2024"
  details?: string[]; // e.g., GPA, honors, relevant coursework
}

interface ProjectEntry {
  name: string;
  description: string;
  technologiesUsed?: string[]; // e.g., ["React", "Node.js"]
  link?: string;
}

interface AnalyzedResume {
  name?: string;
  contactInfo?: ContactInfo;
  summary?: string; // Professional summary or objective statement
  experience?: ExperienceEntry[];
  education?: EducationEntry[];
  skills?: string[] | Record<string, string[]>; // Use Record<string, string[]> only if skills are clearly categorized (e.g., "Languages", "Frameworks"); otherwise a flat string[].
  projects?: ProjectEntry[];
  customSections?: Record<string, string[]>; // Other distinct sections such as "Awards", "Certifications", "Publications", "Languages", keyed by section title.
}

RULES:
1. The output MUST be a single, valid JSON object.
2. All property names and string values MUST be enclosed in double quotes.
3. For lists like responsibilities or skills, provide an array of strings.
4. If a section or field is not present in the resume, omit it or use null for optional fields.
5. Prioritize accuracy and completeness based on the provided text.

RESUME TEXT:
---
{resume_text}
---"#;
