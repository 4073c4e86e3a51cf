use colored::*;

pub struct FeedbackAnalyzer;

impl FeedbackAnalyzer {
    /// Suggests a fix for a failed `patch` run, based on its output.
    pub fn analyze(output: &str) -> Option<String> {
        // 1. Patch already applied, or applied in the wrong direction
        if output.contains("Reversed (or previously applied) patch detected") {
            return Some(format!(
                "The patch looks {}.\nThe upstream release may already contain this change; remove it from the {} directory.",
                "already applied".bold().yellow(),
                "patches".bold().yellow()
            ));
        }

        // 2. Paths in the patch do not match the tree
        if output.contains("can't find file to patch") || output.contains("No file to patch") {
            return Some(format!(
                "The patch refers to a {}.\nPatches are applied with {} from the root of the extracted tree; check the path prefixes (a/, b/).",
                "file that does not exist".bold().red(),
                "-p1".bold().green()
            ));
        }

        // 3. Context drift between releases
        if output.contains("FAILED at") || output.contains("hunks FAILED") || output.contains("hunk FAILED") {
            return Some(format!(
                "Some {} did not apply.\nThe surrounding code changed in this release; regenerate the patch against the new sources (rejects are in {} files).",
                "hunks".bold().red(),
                ".rej".bold().yellow()
            ));
        }

        // 4. Not a diff at all
        if output.contains("Only garbage was found in the patch input")
            || output.contains("malformed patch")
        {
            return Some(format!(
                "The file is {}.\nOnly unified diffs belong in the patches directory.",
                "not a valid patch".bold().red()
            ));
        }

        None
    }
}
