//! Prompt builders for the generation pipeline.
//!
//! Three prompts are used:
//!
//! - [`build_direct_prompt`] - one-shot completion of the function signature
//! - [`build_test_prompt`] - ask for pytest cases for the problem
//! - [`build_solution_prompt`] - ask for an implementation that passes the generated tests
//!
//! ```
//! use humaneval_forge::prompts::{build_direct_prompt, build_test_prompt};
//!
//! let direct = build_direct_prompt("def add(a, b):\n");
//! assert!(direct.ends_with("```python"));
//!
//! let tests = build_test_prompt("def add(a, b):\n");
//! assert!(tests.starts_with("def add(a, b):\n"));
//! ```

/// Instruction appended to the problem when asking for tests.
pub const TEST_INSTRUCTION: &str =
    "Please write pytest test cases covering edge cases and typical inputs.";

/// Instruction appended after the generated tests when asking for a solution.
pub const SOLUTION_INSTRUCTION: &str = "Implement the function so that these tests all pass.";

/// Prompt for direct mode. It ends with an open python fence so the model
/// continues straight into code.
pub fn build_direct_prompt(problem_prompt: &str) -> String {
    format!(">>> Problem:\n{}\n>>> Code:\n```python", problem_prompt)
}

/// Prompt asking for pytest cases for the problem.
pub fn build_test_prompt(problem_prompt: &str) -> String {
    format!("{}\n\n{}", problem_prompt, TEST_INSTRUCTION)
}

/// Prompt asking for an implementation that makes `tests` pass.
pub fn build_solution_prompt(problem_prompt: &str, tests: &str) -> String {
    format!(
        "{}\n\nHere are the pytest tests:\n```{}```\n{}",
        problem_prompt, tests, SOLUTION_INSTRUCTION
    )
}
