//! Callee denylist: APIs that take descriptive strings, not domain values.
//!
//! Pattern grammar, matched against the dotted callee name:
//!
//! | pattern   | matches                                         |
//! |-----------|-------------------------------------------------|
//! | `name`    | the whole callee                                 |
//! | `.name`   | the last segment, when there is a receiver       |
//! | `name.`   | any receiver segment (`logger.` → `self.logger.info`) |
//! | `*Suffix` | last segment ending in `Suffix`                  |
//! | `Prefix*` | last segment starting with `Prefix`              |

use std::sync::LazyLock;

use aho_corasick::AhoCorasick;
use stringly_core::FxHashMap;

pub struct CalleeCategory {
    pub name: &'static str,
    pub patterns: &'static [&'static str],
}

pub const DENYLIST: &[CalleeCategory] = &[
    CalleeCategory {
        name: "collection",
        patterns: &[
            ".append", ".add", ".remove", ".discard", ".index", ".count", ".insert", ".extend",
            ".update", ".has", ".delete", ".set", ".getlist", ".push", ".unshift", "hasattr",
            "setattr", "delattr", "dict", "list", "tuple", "set", "frozenset", "Map", "Set",
        ],
    },
    CalleeCategory {
        name: "string",
        patterns: &[
            ".split", ".rsplit", ".join", ".strip", ".lstrip", ".rstrip", ".replace",
            ".replaceAll", ".startswith", ".endswith", ".startsWith", ".endsWith", ".format",
            ".encode", ".decode", ".find", ".rfind", ".partition", ".rpartition", ".indexOf",
            ".lastIndexOf", ".includes", ".padStart", ".padEnd", ".concat", ".localeCompare",
            ".removeprefix", ".removesuffix", ".ljust", ".rjust", ".center", ".translate",
            ".splitlines", ".casefold", ".trim", ".charAt", ".at",
        ],
    },
    CalleeCategory {
        name: "logging",
        patterns: &[
            "print", "console.", "logger.", "logging.", "log.", "LOGGER.", "LOG.", "warnings.",
            ".debug", ".info", ".warning", ".warn", ".error", ".exception", ".critical",
            ".fatal", ".trace", ".log", "getLogger",
        ],
    },
    CalleeCategory {
        name: "regex",
        patterns: &[
            "re.", "regex.", "RegExp", ".match", ".matchAll", ".search", ".test", ".exec",
            ".fullmatch", ".sub", ".subn", ".findall", ".finditer",
        ],
    },
    CalleeCategory {
        name: "environment",
        patterns: &["environ.", "process.env.", "dotenv.", "env.", "config.get"],
    },
    CalleeCategory {
        name: "filesystem",
        patterns: &[
            "open", "os.path.", "path.", "pathlib.", "Path", "PurePath", "shutil.", "fs.",
            "glob.", "tempfile.", "os.makedirs", "os.mkdir", "os.remove", "os.listdir",
            "os.walk", "os.chdir", "os.system", ".joinpath", ".glob", ".rglob", ".with_suffix",
            ".with_name", ".read_text", ".write_text", ".readFileSync", ".writeFileSync",
            "require", "__import__", "importlib.", "subprocess.",
        ],
    },
    CalleeCategory {
        name: "validation",
        patterns: &[
            "validator", "field_validator", "root_validator", "model_validator", "validates",
            "validate", "pytest.mark.", "deprecated", "override", "Validator",
        ],
    },
    CalleeCategory {
        name: "type_system",
        patterns: &[
            "isinstance", "issubclass", "type", "cast", "typing.", "TypeVar", "NewType",
            "NamedTuple", "TypedDict", "Literal", "ForwardRef", "str", "int", "float", "bool",
            "bytes", "len", "repr", "ord", "chr", "Symbol", "Number", "String", "Boolean",
            "parseInt", "parseFloat", "BigInt", "Object.", "Array.", "Reflect.",
        ],
    },
    CalleeCategory {
        name: "exception",
        patterns: &["*Error", "*Exception", "*Warning", "Error", "abort", "fail", "assert*"],
    },
    CalleeCategory {
        name: "cli",
        patterns: &[
            ".add_argument", ".add_argument_group", ".add_option", ".add_parser",
            ".add_subparsers", "argparse.", "click.", "typer.", "optparse.", ".option",
            ".requiredOption", ".command", ".argument", ".alias", ".usage", ".description",
            ".version",
        ],
    },
    CalleeCategory {
        name: "http",
        patterns: &[
            "requests.", "httpx.", "aiohttp.", "urllib.", "axios.", "axios", "fetch", "http.",
            "https.", "session.", "client.get", "client.post", ".request", "urlopen",
            "URL", "URLSearchParams",
        ],
    },
    CalleeCategory {
        name: "cloud",
        patterns: &[
            "boto3.", "botocore.", ".client", ".resource", ".Bucket", ".Table", ".Object",
            "s3.", "dynamodb.", "storage.", "pubsub.", "aws.",
        ],
    },
    CalleeCategory {
        name: "routing",
        patterns: &[
            ".route", ".post", ".put", ".patch", ".head", ".options", ".api_route",
            ".websocket", ".middleware", ".use", ".listen", ".all", "app.", "router.",
            "Blueprint", "APIRouter", "path", "re_path", "url", "Route",
        ],
    },
    CalleeCategory {
        name: "orm",
        patterns: &[
            "Column", "mapped_column", "ForeignKey", "relationship", "Field", "Index",
            "models.", "sa.", "sqlalchemy.", "db.Column", "knex.", "mongoose.", "z.", "yup.",
            "Joi.", "Schema", ".model", ".query", ".filter_by", ".order_by", ".group_by",
            ".execute", ".executemany", ".raw", ".where", ".select", ".from", ".table",
            ".createTable", ".column", ".references", "text", "sql",
        ],
    },
    CalleeCategory {
        name: "ui",
        patterns: &[
            ".setText", ".setWindowTitle", ".setStyleSheet", ".setObjectName", ".setToolTip",
            ".setPlaceholderText", ".setAttribute", ".getAttribute", ".removeAttribute",
            ".addEventListener", ".removeEventListener", ".dispatchEvent", ".querySelector",
            ".querySelectorAll", ".getElementById", ".getElementsByClassName",
            ".createElement", ".config", ".configure", ".bind", ".emit", ".on", ".off",
            ".once", ".toggle", ".contains", "document.", "window.", "$", "styled.", "css",
            "classNames", "clsx",
        ],
    },
    CalleeCategory {
        name: "testing",
        patterns: &[
            "mock.", "patch", "patch.object", "MagicMock", "Mock", "jest.", "vi.", "sinon.",
            "pytest.", "monkeypatch.", "mocker.", "describe", "it", "test", "expect",
            "beforeEach", "afterEach", ".spyOn", ".toBe", ".toEqual", ".toHaveBeenCalledWith",
            ".toThrow", ".toContain", ".assert_called_with", ".assert_called_once_with",
            ".assert_any_call", ".fixture", ".parametrize",
        ],
    },
    CalleeCategory {
        name: "serialization",
        patterns: &[
            "json.", "JSON.", "pickle.", "yaml.", "toml.", "msgpack.", "struct.", "base64.",
            "codecs.", ".dumps", ".loads", ".to_json", ".to_dict", ".astype", ".serialize",
            ".deserialize", ".strftime", ".strptime", ".isoformat", "format", "Buffer.",
        ],
    },
    CalleeCategory {
        name: "i18n",
        patterns: &["_", "gettext", "ngettext", "pgettext", "t", "i18n.", "intl.", "$t"],
    },
];

/// Callees exempt only at their default-value argument position
/// (0-indexed).
pub const POSITION_EXEMPTIONS: &[(&str, u32)] = &[
    (".get", 1),
    ("getattr", 2),
    ("os.getenv", 1),
    ("getenv", 1),
    (".getenv", 1),
    (".pop", 1),
    (".setdefault", 1),
    ("next", 1),
    (".getOrDefault", 1),
    (".getItem", 1),
];

/// Compiled denylist lookup.
pub struct CalleeMatcher {
    exact: FxHashMap<&'static str, &'static str>,
    methods: FxHashMap<&'static str, &'static str>,
    suffixes: Vec<(&'static str, &'static str)>,
    prefixes: Vec<(&'static str, &'static str)>,
    receivers: Option<AhoCorasick>,
    receiver_categories: Vec<&'static str>,
}

static DEFAULT_MATCHER: LazyLock<CalleeMatcher> = LazyLock::new(|| CalleeMatcher::new(DENYLIST));

impl CalleeMatcher {
    /// The built-in denylist, compiled once.
    pub fn denylist() -> &'static CalleeMatcher {
        &DEFAULT_MATCHER
    }

    pub fn new(categories: &[CalleeCategory]) -> Self {
        let mut matcher = Self {
            exact: FxHashMap::default(),
            methods: FxHashMap::default(),
            suffixes: Vec::new(),
            prefixes: Vec::new(),
            receivers: None,
            receiver_categories: Vec::new(),
        };
        let mut needles = Vec::new();
        for category in categories {
            for &pattern in category.patterns {
                if let Some(suffix) = pattern.strip_prefix('*') {
                    matcher.suffixes.push((suffix, category.name));
                } else if let Some(prefix) = pattern.strip_suffix('*') {
                    matcher.prefixes.push((prefix, category.name));
                } else if let Some(method) = pattern.strip_prefix('.') {
                    matcher.methods.entry(method).or_insert(category.name);
                } else if pattern.ends_with('.') {
                    needles.push(format!(".{pattern}"));
                    matcher.receiver_categories.push(category.name);
                } else {
                    matcher.exact.entry(pattern).or_insert(category.name);
                }
            }
        }
        matcher.receivers = match AhoCorasick::new(&needles) {
            Ok(ac) => Some(ac),
            Err(e) => {
                tracing::warn!(error = %e, "receiver denylist failed to compile");
                None
            }
        };
        matcher
    }

    /// Category of the first matching pattern, if any.
    pub fn category_of(&self, callee: &str) -> Option<&'static str> {
        if let Some(category) = self.exact.get(callee).copied() {
            return Some(category);
        }
        let (receiver, last) = match callee.rsplit_once('.') {
            Some((receiver, last)) => (Some(receiver), last),
            None => (None, callee),
        };
        if receiver.is_some() {
            if let Some(category) = self.methods.get(last).copied() {
                return Some(category);
            }
            if let Some(ac) = &self.receivers {
                let haystack = format!(".{callee}");
                if let Some(m) = ac.find(&haystack) {
                    return self.receiver_categories.get(m.pattern().as_usize()).copied();
                }
            }
        }
        self.suffixes
            .iter()
            .find(|(suffix, _)| last.ends_with(suffix) && last.len() > suffix.len())
            .or_else(|| {
                self.prefixes
                    .iter()
                    .find(|(prefix, _)| last.starts_with(prefix))
            })
            .map(|(_, category)| *category)
    }
}

/// Match one pattern of the grammar above against `callee`.
pub fn pattern_matches(pattern: &str, callee: &str) -> bool {
    let (receiver, last) = match callee.rsplit_once('.') {
        Some((receiver, last)) => (Some(receiver), last),
        None => (None, callee),
    };
    if let Some(suffix) = pattern.strip_prefix('*') {
        last.ends_with(suffix) && last.len() > suffix.len()
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        last.starts_with(prefix)
    } else if let Some(method) = pattern.strip_prefix('.') {
        receiver.is_some() && last == method
    } else if let Some(segment) = pattern.strip_suffix('.') {
        receiver.is_some_and(|r| format!(".{r}.").contains(&format!(".{segment}.")))
    } else {
        callee == pattern
    }
}

/// True when `(callee, param_index)` is a default-value slot.
pub fn is_exempt_position(callee: &str, param_index: u32) -> bool {
    POSITION_EXEMPTIONS
        .iter()
        .any(|(pattern, index)| *index == param_index && pattern_matches(pattern, callee))
}
