//! Prompt engineering for the four analyzer operations
//!
//! Every prompt demands raw JSON against a named schema; the normalizer
//! still tolerates fenced replies from models that ignore the mandate.

use codelens_domain::{ExplanationMode, TestCase};
use uuid::Uuid;

/// Session-wide persona sent as the system instruction with every request
pub const SYSTEM_INSTRUCTION: &str = r#"You are CodeLens, a multi-language AI debugger supporting R, Python, C++, JavaScript and Java with deep expertise in each language's idioms, common errors, and best practices.

## PRIMARY FOCUS: R PROGRAMMING
You have deep expertise in R and its ecosystem. When analyzing R code, you excel at:

**Common R Errors & Solutions:**
1. "object not found" → Variable typo or forgot to assign/load data. Suggest checking spelling and using ls() to see available objects.
2. "object of type 'closure' is not subsettable" → User tried to subset a function instead of calling it. Example: df[data()] should be df[data]. Explain: "You're treating a function like data when it needs () to execute."
3. "could not find function" → Package not loaded (forgot library()) or function name typo. Suggest library(packagename) and check spelling.
4. "subscript out of bounds" → Accessing index beyond vector/dataframe length. Show how to check length() or nrow()/ncol().
5. "arguments imply differing number of rows" → data.frame() columns have mismatched lengths. Explain: "All columns in a data.frame must have the same length."
6. "non-numeric argument to binary operator" → Trying to add/multiply non-numbers. Check for factors or characters. Suggest as.numeric() or str() to inspect types.
7. "cannot open the connection" → File path wrong or file doesn't exist. Suggest using file.exists() and getwd() to debug paths.
8. "package 'X' is not installed" → Need install.packages("X"). Explain the difference between install.packages() (once) and library() (every session).
9. "$ operator is invalid for atomic vectors" → Trying to use $ on a vector. Explain: "$ is for lists/data.frames. Use [[index]] for vectors."
10. "replacement has length zero" → Assigning empty result, often from bad subsetting. Show how to check with length() before assignment.

**When explaining R errors:**
- Use tidyverse-friendly language when appropriate (dplyr, ggplot2, tidyr)
- Suggest modern alternatives: "Instead of subset(), consider dplyr::filter()"
- Explain R quirks: 1-indexing (not 0), vectorization, recycling rules
- Reference packages: "This is easier with library(dplyr)" or "ggplot2 expects a data.frame here"
- Show both base R and tidyverse solutions when relevant

**R-Specific Debugging Tips:**
- Remind users to check class() and str() to inspect object types
- Suggest using head(df) to preview data before operations
- Mention common pitfalls: factors vs characters, matrix vs data.frame, list vs vector
- Explain pipe operator %>% errors (missing pipes, wrong data flow)

Goals for ALL languages:
- Extract code or math from inputs
- Diagnose logic/syntax errors; explain root causes
- Produce corrected code and minimal test cases
- Offer clear, friendly explanations adapting to beginner/advanced levels
- Generate short practice problems

Format:
IMPORTANT: Return ONLY valid JSON, no markdown fences. Start response with { and end with }."#;

/// Prompt for extracting code or math from an attached image
pub fn extraction_prompt() -> String {
    r#"Analyze this image. If it contains code or a math problem, extract it.
Return JSON matching schema A:
{
  "type":"code_extraction",
  "language":"python|java|cpp|js|r|unknown",
  "text":"<code_text>",
  "lines":[{"n":1,"text":"..."}],
  "confidence":0.0-1.0
}"#
    .to_string()
}

/// Prompt for the full five-section code analysis
pub fn analysis_prompt(code: &str, language: &str, mode: ExplanationMode) -> String {
    format!(
        r#"Analyze the following {language} code for a {mode} user.
Code:
{code}

Return a JSON object containing five keys: "errorAnalysis", "correction", "explanation", "reasoningSteps", "followUpSuggestion", "flowDiagram".

1. "errorAnalysis": Schema B
{{
  "type":"error_analysis",
  "errors":[{{"line":int,"kind":"syntax|logic|runtime","root_cause":"...","confidence":0.0-1.0}}],
  "short_overlay":"..."
}}
IMPORTANT: 'line' must point to the 1-based line number of the ACTUAL code statement containing the error. Do not select comments or blank lines.

2. "correction": Schema C
{{
  "type":"correction",
  "corrected_code":"<code>",
  "patch_summary":"...",
  "fixed_lines": [int],
  "tests":[{{"id":"t1","input":"...","expected":"..."}}],
  "exec_safe": true|false
}}
IMPORTANT: 'fixed_lines' must be an array of 1-based line numbers in the 'corrected_code' that correspond to the fix.
IMPORTANT: 'tests' must ALWAYS contain at least ONE test case. For simple fixes, generate a basic test like [{{"id":"t1","input":"c(10, 20, 30)","expected":"60"}}] for R or [{{"id":"t1","input":"[1,2,3]","expected":"6"}}] for Python. Never leave this empty.

3. "explanation": Schema F
{{
  "type":"explanation",
  "text":"..."
}}

4. "reasoningSteps": ["step 1", "step 2", "step 3"]
Add a 'reasoningSteps' array with 3–5 short bullet points explaining how you identified the bug and arrived at the fix. Each step should be one clear sentence (e.g., 'Detected undefined variable b on line 3', 'Checked surrounding scope for definition', 'Identified likely typo from variable a').

5. "followUpSuggestion": "suggestion string"
After fixing this bug, suggest ONE next improvement the user could make (e.g., add input validation, optimize time complexity, handle edge cases). Keep it to one short sentence. If no further improvement is needed, return empty string.

6. "flowDiagram": (optional, only if code has loops/conditionals)
{{
  "ascii": "<diagram_text>",
  "caption": "short description"
}}

If the code contains loops (for, while), conditionals (if/else), or function calls, generate a simple ASCII flow diagram showing execution flow.

Example for R loop with off-by-one error:
START
  ↓
i = 1
  ↓
┌──────────────────┐
│ i <= length(vec)+1? │ ← ⚠️ Bug: goes beyond length
└──────────────────┘
  Yes ↓         No ↓
total += vec[i]   EXIT ✓
(if i > len → NA) ❌
  ↓
i = i + 1
  ↓
(loop back) ──┘

Keep it simple (8-12 lines max). Use these characters: ─ │ ┌ ┐ └ ┘ ↓ ← and emoji: ⚠️ (bugs), ❌ (errors), ✓ (correct).
Highlight bugs with ⚠️ or ❌ to make them visually distinct.
If no loops/conditionals present, omit this field entirely (don't return empty)."#,
        language = language,
        mode = mode.as_str(),
        code = code,
    )
}

/// Prompt for generating a practice problem targeting one concept
///
/// Each call embeds a fresh request id so a repeated concept still produces
/// a distinct prompt; when the user already saw a problem, an explicit
/// do-not-repeat block carries its text.
pub fn practice_prompt(
    concept_label: &str,
    context: &str,
    language: &str,
    mode: ExplanationMode,
    previous_prompt: Option<&str>,
) -> String {
    let mut prompt = format!(
        r#"Generate a single practice problem specifically about: {concept_label}.

Context from analysis: "{context}"

Settings:
- Language/Type: {language}
- Difficulty: {mode}
- Request ID: {request_id}

Instructions:
- For code bugs (e.g., undefined variable, off-by-one), create a small code snippet with a similar mistake.
- For reasoning/math problems (e.g., sequence patterns), create a similar reasoning challenge.
- Do NOT generate unrelated word problems (e.g., cookie counting for a sequence problem).
- The practice must target the same underlying concept as the original error.
"#,
        concept_label = concept_label,
        context = context,
        language = language,
        mode = mode.as_str(),
        request_id = Uuid::new_v4(),
    );

    if let Some(previous) = previous_prompt {
        prompt.push_str(&format!(
            "\nCRITICAL INSTRUCTION: The user has already seen the following problem: \"{previous}\".\nYou MUST generate a DIFFERENT problem.\n"
        ));
    }

    prompt.push_str(
        r#"
Return JSON Schema G:
{
  "type":"practice",
  "problems":[{"id":"p1","prompt":"...","hint":"...","solution":"...","grader":"exact|fuzzy"}]
}"#,
    );

    prompt
}

/// Prompt for simulating test execution against the supplied cases
pub fn execution_prompt(code: &str, tests: &[TestCase]) -> String {
    let tests_json =
        serde_json::to_string_pretty(tests).unwrap_or_else(|_| "[]".to_string());

    format!(
        r#"Simulate the execution of this code against the provided test cases.

Code to test:
```
{code}
```

Test cases:
{tests_json}

Return JSON Schema D:
{{
  "type":"execution_result",
  "test_results":[{{"id":"t1","status":"pass|fail","output":"...","expected":"..."}}],
  "stdout":"...",
  "stderr":"..."
}}

Important: Always return at least one test result, even if simulated. If code has syntax errors, show them in stderr."#,
        code = code,
        tests_json = tests_json,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_instruction_mandates_raw_json() {
        assert!(SYSTEM_INSTRUCTION.contains("Return ONLY valid JSON"));
        assert!(SYSTEM_INSTRUCTION.contains("Start response with { and end with }"));
    }

    #[test]
    fn test_extraction_prompt_names_schema() {
        let prompt = extraction_prompt();
        assert!(prompt.contains("schema A"));
        assert!(prompt.contains("\"confidence\""));
        assert!(prompt.contains("code_extraction"));
    }

    #[test]
    fn test_analysis_prompt_embeds_inputs() {
        let prompt = analysis_prompt("total <- sum(x)", "R", ExplanationMode::Beginner);
        assert!(prompt.contains("total <- sum(x)"));
        assert!(prompt.contains("Analyze the following R code for a beginner user."));
    }

    #[test]
    fn test_analysis_prompt_carries_contract_rules() {
        let prompt = analysis_prompt("x", "Python", ExplanationMode::Advanced);
        assert!(prompt.contains("ACTUAL code statement"));
        assert!(prompt.contains("ALWAYS contain at least ONE test case"));
        assert!(prompt.contains("reasoningSteps"));
        assert!(prompt.contains("followUpSuggestion"));
        assert!(prompt.contains("flowDiagram"));
    }

    #[test]
    fn test_practice_prompt_targets_concept() {
        let prompt = practice_prompt(
            "division by zero",
            "Identified Errors: dividing by n.",
            "Python",
            ExplanationMode::Beginner,
            None,
        );
        assert!(prompt.contains("specifically about: division by zero"));
        assert!(prompt.contains("Identified Errors: dividing by n."));
        assert!(!prompt.contains("CRITICAL INSTRUCTION"));
    }

    #[test]
    fn test_practice_prompt_excludes_previous_problem() {
        let prompt = practice_prompt(
            "off-by-one",
            "ctx",
            "R",
            ExplanationMode::Advanced,
            Some("Fix the loop bound in this snippet."),
        );
        assert!(prompt.contains("CRITICAL INSTRUCTION"));
        assert!(prompt.contains("Fix the loop bound in this snippet."));
        assert!(prompt.contains("MUST generate a DIFFERENT problem"));
    }

    #[test]
    fn test_practice_prompt_is_nonced() {
        let first = practice_prompt("c", "ctx", "R", ExplanationMode::Beginner, None);
        let second = practice_prompt("c", "ctx", "R", ExplanationMode::Beginner, None);
        assert_ne!(first, second);
    }

    #[test]
    fn test_execution_prompt_serializes_tests() {
        let tests = vec![TestCase {
            id: "t1".to_string(),
            input: "c(1, 2)".to_string(),
            expected: "3".to_string(),
        }];
        let prompt = execution_prompt("sum(x)", &tests);
        assert!(prompt.contains("sum(x)"));
        assert!(prompt.contains("\"t1\""));
        assert!(prompt.contains("c(1, 2)"));
        assert!(prompt.contains("Schema D"));
        assert!(prompt.contains("stderr"));
    }
}
