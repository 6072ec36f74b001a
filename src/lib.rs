/*!

# relinear - linear-time regular expressions over bytes and text

This crate provides a regular expression engine with a worst-case running time
linear in the length of the subject. Patterns use the familiar Perl-like
syntax, minus the features which cannot be matched in linear time
(backreferences and lookaround).

# Example: test if a string contains a match

```rust
use relinear::Regex;
let re = Regex::new(r"\d{4}").unwrap();
assert!(re.is_match("2020-20-05"));
```

# Example: iterating over matches

```rust
use relinear::Regex;
let re = Regex::new(r"(\w+)\s+(car)").unwrap();
let text = "red car white car";
let starts: Vec<usize> = re.find_iter(text).map(|m| m.start()).collect();
assert_eq!(starts, vec![0, 8]);
```

# Example: using capture groups

Capture groups are available in the `Match` object produced by a successful
match. A capture group is a range of indexes into the subject.

```rust
use relinear::Regex;
let re = Regex::new(r"(?P<year>\d{4})-(\d{2})").unwrap();
let text = "Today is 2020-12-05";
let m = re.find(text).unwrap();
assert_eq!(m.group_slice(1), Some("2020"));
assert_eq!(m.named_group("year"), Some(9..13));
```

# Subjects

A regex can search `str`, `[u8]`, and [`Text`], which wraps UTF-16 or UTF-32
code units. Offsets are always reported in the subject's own units:

```rust
use relinear::{Regex, Text};
let re = Regex::new("\u{5C5E}").unwrap();
let s = "\u{20000}\u{5C5E}";
assert_eq!(re.find(s).unwrap().range(), 4..7);
let units: Vec<u16> = s.encode_utf16().collect();
assert_eq!(re.find(&Text::new(&units)).unwrap().range(), 2..3);
```

Byte subjects are searched as they are. Text is encoded to UTF-8 once per
`Text` value; lone surrogates are replaced by U+FFFD.

# Flags

[`Flags`] select case-insensitivity (`i`), multiline anchors (`m`), dot-all
(`s`), ungreedy quantifiers (`U`), Latin-1 semantics (`l`), leftmost-longest
matching (`L`), literal patterns (`q`) and single capture (`c`). Flags may
also be set inline with `(?flags)` and `(?flags:...)`.

```rust
use relinear::Regex;
let re = Regex::with_flags("a|ab", "L").unwrap();
assert_eq!(re.find("ab").unwrap().range(), 0..2);
```

In Latin-1 mode each byte is one character:

```rust
use relinear::Regex;
let re = Regex::with_flags("caf.", "l").unwrap();
assert!(re.is_match(&b"caf\xE9"[..]));
```

# Unicode remarks

Case-insensitive matching uses simple Unicode case folding:

```rust
use relinear::Regex;
let re = Regex::with_flags("\u{00B5}", "i").unwrap();
assert!(re.find("\u{03BC}").is_some());
```

Perl classes like `\d`, `\w` and `\s`, and word boundaries, are ASCII-only.

# Architecture

relinear has a parser, intermediate representation, a bytecode emitter which
lowers characters to UTF-8 (or Latin-1) byte sequences, and a Pike VM which
simulates every thread of the program in lockstep. The program is immutable
once compiled, so a `Regex` may be shared between threads.

# Crate features

- **prohibit-unsafe**. Use bounds-checked indexing in the engine's hot loop.

*/

#![warn(clippy::all)]
#![allow(clippy::upper_case_acronyms, clippy::match_like_matches_macro)]
// Clippy's manual_range_contains suggestion produces worse codegen.
#![allow(clippy::manual_range_contains)]

pub use crate::api::*;
pub use crate::cache::RegexCache;
pub use crate::emit::DEFAULT_SIZE_LIMIT;
pub use crate::indexing::{CodeUnit, Subject, Text};

mod util;

mod api;
mod bytesearch;
mod cache;
mod charclasses;
mod codepointset;
mod emit;
mod exec;
mod folds;
mod indexing;
mod insn;
mod ir;
mod matchers;
mod parse;
mod pikevm;
mod sparse;
mod startpredicate;
mod types;
mod utf8;
