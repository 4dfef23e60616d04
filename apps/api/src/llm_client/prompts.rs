// Cross-cutting prompt fragments shared by every feature prompt.
// Feature-specific templates live next to the feature (see analysis/prompts.rs).

/// Closing instruction that enforces a bare JSON object as the whole answer.
pub const JSON_ONLY_INSTRUCTION: &str = "CRITICAL: The entire response must be a single, \
    valid JSON object and nothing else. Do not include any introductory or conversational \
    text, and do not wrap the JSON in markdown code fences. Double-check for syntax errors \
    like trailing commas or unquoted strings before responding.";

/// Shape description for a frequency-scored list.
pub const SKILL_LIST_SHAPE: &str = "Each key should have an array of objects as its value. \
    Each object in the array must have two properties: \"name\" (string) and \"frequency\" \
    (number, representing a score of importance based on frequency and context in the job \
    descriptions). Sort each list by frequency in descending order.";
