//! Documentation content for the livevars CLI

use super::CliError;

/// Available documentation categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocCategory {
    Queries,
    References,
    Functions,
    CustomFunctions,
    Markup,
}

impl DocCategory {
    /// Parse category name from string
    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "queries" | "query" => Some(Self::Queries),
            "references" | "reference" | "refs" | "paths" => Some(Self::References),
            "functions" | "builtins" => Some(Self::Functions),
            "custom-functions" | "custom" | "jsfunc" | "scripts" => Some(Self::CustomFunctions),
            "markup" | "spans" | "render" => Some(Self::Markup),
            _ => None,
        }
    }
}

/// Get the docs overview (category listing)
pub fn get_docs_overview() -> &'static str {
    r#"LIVEVARS DOCUMENTATION

Live variables compute values from the front-matter properties of Markdown
documents and keep the result inline, next to the query that produced it.

DOCUMENTATION CATEGORIES

  queries            Query syntax: name(arguments)
  references         Addressing properties in this and other documents
  functions          Built-in functions: get, sum, jsFunc, codeBlock
  custom-functions   The language of jsFunc bodies and saved functions
  markup             How rendered variables are stored in documents

QUICK REFERENCE

  get(total)                           One property of this document
  get(projects/budget.md/total)        One property of another document
  sum(rent, food)                      Numbers are added, anything else joined
  jsFunc(a, b, func = (x, y) => x * y) Inline custom function
  codeBlock(v, code = f({{v}}), lang = py)
                                       Code block with substituted values

Run 'livevars doc <category>' for detailed documentation.
"#
}

/// Get documentation for a specific category
pub fn get_doc_category(name: &str) -> Result<&'static str, CliError> {
    match DocCategory::from_name(name) {
        Some(DocCategory::Queries) => Ok(QUERIES_DOC),
        Some(DocCategory::References) => Ok(REFERENCES_DOC),
        Some(DocCategory::Functions) => Ok(FUNCTIONS_DOC),
        Some(DocCategory::CustomFunctions) => Ok(CUSTOM_FUNCTIONS_DOC),
        Some(DocCategory::Markup) => Ok(MARKUP_DOC),
        None => Err(CliError::UnknownCategory(name.to_string())),
    }
}

const QUERIES_DOC: &str = r#"QUERIES - Query Syntax

FORM
  name(arguments)
    A query is a single function call. Whitespace around the call is
    ignored. The arguments run from the first "(" to the last ")".

ARGUMENT LISTS
  get, sum, concat and saved custom functions
    Comma-separated references, each trimmed.

      sum(a, b, notes/c.md/d)      -> ["a", "b", "notes/c.md/d"]
      sum()                        -> []

  jsFunc
    [references ","] func = code
    The last ", func =" separates the references from the code, so the
    code may contain commas, parentheses and newlines.

      jsFunc(x, y, func = (a, b) => a + b)

  codeBlock
    [references ","] code = text "," lang = language
    The first ", code =" ends the references, the last ", lang =" ends the
    code text.

      codeBlock(v, code = print({{v}}), lang = python)

ERRORS
  - Text that is not name(...)           malformed query
  - A name that is neither built in nor saved   unknown function
  - jsFunc without func =, codeBlock without code = / lang =
                                          argument parsing error
"#;

const REFERENCES_DOC: &str = r#"REFERENCES - Addressing Properties

LOCAL
  total
  owner.name
  items[0].cost
    A reference without "/" is a property path in the current document.
    Dots step into mappings, brackets into lists.

GLOBAL
  projects/budget.md/total
    Everything before the last "/" is the document path, relative to the
    vault root; the rest is the property path.

RESOLUTION
  - A missing document, property or index has no value ("undefined")
  - The empty reference has no value
  - Local paths shadow global ones in suggestions and previews

LISTING
  livevars paths [FILTER] --vault DIR [--note NOTE] [--prefix] [--local]
    Every path, local ones first. Containers are listed as well as their
    members, e.g. "items", "items[0]", "items[0].cost".
"#;

const FUNCTIONS_DOC: &str = r#"FUNCTIONS - Built-in Functions

GET
  get(reference)
    The referenced value. An unresolvable reference gives "".
    Exactly one reference is accepted.

SUM
  sum(reference, ...)
    If every value is a number, their sum (0 for no arguments).
    Otherwise the values' text forms joined together; an unresolvable
    reference contributes "".

      sum(a, b)       a = 2, b = 3      -> 5
      sum(a, b)       a = "x", b = 3    -> "x3"

JSFUNC
  jsFunc(reference, ..., func = code)
    Calls the function literal in code with the referenced values, in
    order. Fails (no value) if a reference does not resolve, the argument
    count differs from the parameter count, or the code throws.

CODEBLOCK
  codeBlock(reference, ..., code = text, lang = language)
    Replaces each {{...}} placeholder in text with the next referenced
    value and wraps the result in a fenced code block. The number of
    placeholders must equal the number of references.

CUSTOM
  name(reference, ...)
    A function saved with 'livevars functions add', evaluated like jsFunc.

CONCAT
  concat(...)
    Reserved. Parses, but has no value.
"#;

const CUSTOM_FUNCTIONS_DOC: &str = r#"CUSTOM-FUNCTIONS - The Function Language

FUNCTION LITERALS
  x => x * 2
  (a, b) => a + b
  (net) => { const rate = 0.2; return net * (1 + rate); }
  function (a, b) { return a > b ? a : b; }

VALUES
  Numbers, 'strings' or "strings", true, false, null, undefined,
  [arrays] and {objects}.

OPERATORS
  Arithmetic        + - * / %     ("+" joins if either side is a string)
  Comparison        < <= > >=  == !=  === !==
  Logical           && || ! ??
  Conditional       cond ? a : b
  Access            obj.name  obj["name"]  list[0]

STRING METHODS
  length toUpperCase toLowerCase trim includes startsWith endsWith
  indexOf slice split replace replaceAll repeat padStart padEnd concat
  charAt at toString

ARRAY METHODS
  length join includes indexOf slice concat reverse at
  map filter find findIndex some every reduce
    Callbacks must be written in place: items.map(x => x * 2)

NUMBER METHODS
  toFixed toString

GLOBALS
  Math.round floor ceil abs min max pow sqrt trunc sign, Math.PI, Math.E
  JSON.stringify JSON.parse
  Object.keys Object.values Object.entries
  String() Number() Boolean() parseInt() parseFloat()

LIMITS
  Functions only see their arguments. Each evaluation step counts against
  a budget (scriptMaxSteps in the settings, 100000 by default); running
  out is an error and the query has no value.
"#;

const MARKUP_DOC: &str = r#"MARKUP - Rendered Variables

FORM
  <span query="QUERY"></span>VALUE<span type="end"></span>
    QUERY is escaped: & " < > become entities and newlines become &#10;.
    VALUE is the text form of the result; lists and objects are JSON.

OLDER FORMS
  <span id="REF"/>VALUE<span type="end"/>          read as get(REF)
  <span query="QUERY"/>VALUE<span type="end"/>
    Both are rewritten in the current form when rendered.

RENDERING
  livevars render NOTE --vault DIR [--write]
    Recomputes every span. A span whose query fails or has no value is
    left unchanged; the others are still updated.
"#;
