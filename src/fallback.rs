//! Canned mentor responses
//!
//! Last tier of the fallback chain: deterministic keyword matching over
//! the user's message, no network, never fails. Branches are checked in
//! declaration order and the first match wins, so a message containing
//! both "hello" and "debug" gets the greeting reply.

const GREETING_TERMS: &[&str] = &["hello", "hi", "hey", "greetings"];
const REVIEW_TERMS: &[&str] = &["code review", "review my code", "pull request"];
const ALGORITHM_TERMS: &[&str] = &["algorithm", "optimize", "complexity", "performance"];
const LEARNING_TERMS: &[&str] = &["learn", "career", "roadmap", "study"];
const DEBUG_TERMS: &[&str] = &["debug", "bug", "error", "crash"];
const ARCHITECTURE_TERMS: &[&str] = &["architecture", "design", "scalable", "microservice"];

const GREETING_REPLY: &str = "\
Hello! I'm your AI mentor. 👋

I can help you with:
- **Code reviews** - share a snippet and we'll walk through it
- **Debugging** - describe the symptom and we'll narrow it down
- **Algorithms & performance** - picking the right approach
- **Architecture** - structuring systems that hold up
- **Career growth** - what to learn next and why

What are you working on today?";

const REVIEW_REPLY: &str = "\
## Code Review Tips

A solid review process starts before anyone reads a line:

1. **Keep changes small.** Reviews over ~400 lines miss defects; split them.
2. **Explain the why.** A one-paragraph description saves the reviewer ten minutes of archaeology.
3. **Review for correctness first**, style second. Lint tools handle formatting; humans should hunt for edge cases, error handling, and surprising coupling.
4. **Ask questions instead of issuing verdicts.** \"What happens if this list is empty?\" lands better than \"this is wrong.\"
5. **Approve with nits.** Don't block a merge on naming taste.

Paste a snippet here and I'll review it with you.";

const ALGORITHM_REPLY: &str = "\
## Thinking About Algorithms & Performance

Before optimizing anything:

1. **Measure first.** Profile; don't guess. The slow part is rarely where you think.
2. **Know your complexity.** An O(n²) loop over 100 items is fine; over 10 million it isn't.
3. **Pick the right data structure.** Most \"slow algorithm\" problems are really \"wrong container\" problems - hash maps for lookup, heaps for top-k, sets for membership.
4. **Optimize the algorithm before the code.** A better approach beats micro-tuning every time.
5. **Keep the readable version.** Leave the naive implementation in a test as the oracle for the fast one.

Tell me about the specific problem and I'll help you work through it.";

const LEARNING_REPLY: &str = "\
## Growing as a Developer

A rough roadmap that works at any level:

1. **Go deep on one stack** before going wide. Depth teaches you what questions to ask everywhere else.
2. **Build things you'll actually use.** Motivation survives contact with reality; tutorial projects don't.
3. **Read other people's code.** An hour in a well-built open-source repo teaches more than most courses.
4. **Learn the layer below you.** Frontend? Learn HTTP. Backend? Learn your database's query planner.
5. **Write about what you learn.** Explaining forces understanding.

What area are you trying to grow in right now?";

const DEBUG_REPLY: &str = "\
## Debugging Systematically

When something breaks:

1. **Reproduce it reliably** first. An intermittent bug pinned to a reproduction is already half fixed.
2. **Read the error message.** All of it. Twice. The answer is in there more often than pride admits.
3. **Bisect the problem space.** Comment out half, test, repeat - or use `git bisect` when \"it used to work.\"
4. **Check your assumptions.** Print the actual value, don't trust the name. \"It can't be the config\" - it's the config.
5. **Explain it out loud.** Rubber-duck debugging works because narrating forces sequential logic.

Share the error and the surrounding code and we'll dig in.";

const ARCHITECTURE_REPLY: &str = "\
## Architecture & System Design

Principles that age well:

1. **Start simpler than you think you need.** A modular monolith beats premature microservices every time.
2. **Design the boundaries, not the internals.** Interfaces between components outlive any implementation.
3. **Make state explicit.** Most scaling pain is hidden shared state; find it before it finds you.
4. **Plan for failure.** Every network call fails eventually - decide up front what the user sees when it does.
5. **Write it down.** A one-page design doc catches flaws reviewers of code never will.

Describe the system you're designing and I'll help you pressure-test it.";

const DEFAULT_REPLY: &str = "\
I'm your AI mentor - ask me anything about software development!

Some things I'm good at:
- Reviewing code and suggesting improvements
- Working through bugs and error messages
- Choosing algorithms and data structures
- Designing systems and APIs
- Planning what to learn next

What would you like to dig into?";

/// Produce a canned mentor reply for `message`. Pure and total: same
/// input, same output, no I/O, never fails.
///
/// Conversation history is deliberately not a parameter: canned replies
/// depend only on the current message, so passing history would suggest
/// an influence it does not have.
pub fn generate(message: &str) -> String {
    let lower = message.to_lowercase();

    // Greeting terms are short words; match on word boundaries so that
    // e.g. "this" does not count as "hi".
    let words: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    if GREETING_TERMS.iter().any(|t| words.contains(t)) {
        return GREETING_REPLY.to_string();
    }

    let contains_any = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));
    if contains_any(REVIEW_TERMS) {
        return REVIEW_REPLY.to_string();
    }
    if contains_any(ALGORITHM_TERMS) {
        return ALGORITHM_REPLY.to_string();
    }
    if contains_any(LEARNING_TERMS) {
        return LEARNING_REPLY.to_string();
    }
    if contains_any(DEBUG_TERMS) {
        return DEBUG_REPLY.to_string();
    }
    if contains_any(ARCHITECTURE_TERMS) {
        return ARCHITECTURE_REPLY.to_string();
    }

    DEFAULT_REPLY.to_string()
}
