//! Cask manifest model and parser.
//!
//! A manifest is a single `cask "<token>" do ... end` block. Parsing
//! produces an unresolved [`Manifest`]: URLs and paths still carry their
//! `#{version}` templates, and every declared source is kept with its
//! architecture tag. See [`crate::resolve`] for the next step.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::error::{CaskError, Result, SourceLocation};
use crate::lexer::{Token, TokenKind, tokenize};

pub use cask_schema::{Arch, CaskToken, Checksum, LivecheckStrategy, NO_CHECK, Version};

/// A download declared by a top-level `url`/`sha256` pair or an `on_*` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Source {
    /// URL template.
    pub url: String,
    /// `None` when the source applies to any architecture.
    pub arch: Option<Arch>,
    /// Expected digest or the skip sentinel.
    pub checksum: Checksum,
}

/// `uninstall quit: ...`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Uninstall {
    /// Bundle identifiers to ask to quit before removal.
    pub quit: Vec<String>,
}

/// `zap trash: [...]`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Zap {
    /// Path templates to delete, in declaration order.
    pub trash: Vec<String>,
}

/// `livecheck do ... end`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Livecheck {
    /// Feed URL template.
    pub url: String,
    /// How the feed is interpreted.
    pub strategy: LivecheckStrategy,
}

/// A parsed, unresolved cask manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    /// Unique cask name.
    pub token: CaskToken,
    /// Declared version, substituted verbatim into templates.
    pub version: Version,
    /// Display names, in declaration order.
    pub name: Vec<String>,
    /// One-line description, whitespace-normalised.
    pub desc: Option<String>,
    /// Project homepage.
    pub homepage: Option<String>,
    /// Every declared source; agnostic sources have `arch == None`.
    pub sources: Vec<Source>,
    /// `.app` bundle copied into the applications directory.
    pub app: Option<String>,
    /// Uninstall directive.
    pub uninstall: Option<Uninstall>,
    /// Full-reset directive.
    pub zap: Option<Zap>,
    /// Upstream version feed.
    pub livecheck: Option<Livecheck>,
    /// Where the `cask` keyword was found.
    pub location: SourceLocation,
}

impl Manifest {
    /// Parse exactly one manifest from `content`.
    ///
    /// # Errors
    ///
    /// Returns [`CaskError::MalformedManifest`] if the text is not a single
    /// well-formed cask block.
    pub fn parse(content: &str) -> Result<Self> {
        parse_one(content, None)
    }

    /// Parse a manifest file on disk, recording its path in the location.
    ///
    /// # Errors
    ///
    /// Returns [`CaskError::Io`] if the file cannot be read, or
    /// [`CaskError::MalformedManifest`] if its contents are invalid.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        parse_one(&content, Some(path.to_path_buf()))
    }

    /// The display name: the first `name` stanza, or the token.
    pub fn display_name(&self) -> &str {
        self.name.first().map_or(self.token.as_str(), String::as_str)
    }

    /// Architectures this manifest can be installed on.
    pub fn supported_arches(&self) -> Vec<Arch> {
        if self.sources.iter().any(|s| s.arch.is_none()) {
            return Arch::ALL.to_vec();
        }
        Arch::ALL
            .into_iter()
            .filter(|a| self.sources.iter().any(|s| s.arch == Some(*a)))
            .collect()
    }
}

impl std::str::FromStr for Manifest {
    type Err = CaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parse every cask block in `content`.
///
/// # Errors
///
/// Returns the first [`CaskError::MalformedManifest`] encountered.
pub fn parse_all(content: &str, path: Option<&Path>) -> Result<Vec<Manifest>> {
    let tokens = tokenize(content).map_err(|e| {
        CaskError::malformed(
            SourceLocation::new(path.map(Path::to_path_buf), e.line),
            e.message,
        )
    })?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        path: path.map(Path::to_path_buf),
    };
    parser.file()
}

fn parse_one(content: &str, path: Option<PathBuf>) -> Result<Manifest> {
    let mut manifests = parse_all(content, path.as_deref())?;
    if manifests.len() == 1 {
        return Ok(manifests.remove(0));
    }
    Err(CaskError::malformed(
        SourceLocation::new(path, manifests.first().map_or(1, |m| m.location.line)),
        format!("expected exactly one cask block, found {}", manifests.len()),
    ))
}

/// Bundle names are joined onto the applications directory and must stay a
/// single path component.
pub(crate) fn check_app_name(app: &str) -> Result<(), String> {
    if app.is_empty() {
        return Err("app must not be empty".to_string());
    }
    if app.contains('/') || app == "." || app == ".." {
        return Err(format!("app '{app}' must be a bundle name, not a path"));
    }
    Ok(())
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A `url`/`sha256` pair being assembled.
#[derive(Default)]
struct SourceDraft {
    url: Option<String>,
    checksum: Option<Checksum>,
    line: usize,
}

impl SourceDraft {
    fn is_empty(&self) -> bool {
        self.url.is_none() && self.checksum.is_none()
    }
}

/// Scalar or list stanza argument.
enum Value {
    Str(String),
    Symbol(String),
    List(Vec<String>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    path: Option<PathBuf>,
}

impl Parser {
    fn peek(&self) -> &Token {
        // tokenize() always terminates the stream with Eof
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn location(&self, line: usize) -> SourceLocation {
        SourceLocation::new(self.path.clone(), line)
    }

    fn error(&self, line: usize, reason: impl Into<String>) -> CaskError {
        CaskError::malformed(self.location(line), reason)
    }

    fn unexpected(&self, tok: &Token, expected: &str) -> CaskError {
        self.error(
            tok.line,
            format!("expected {expected}, found {}", tok.kind.describe()),
        )
    }

    fn skip_newlines(&mut self) {
        while self.peek().kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    fn expect_ident(&mut self, word: &str) -> Result<Token> {
        let tok = self.advance();
        if tok.kind == TokenKind::Ident(word.to_string()) {
            Ok(tok)
        } else {
            Err(self.unexpected(&tok, &format!("'{word}'")))
        }
    }

    fn expect_string(&mut self, what: &str) -> Result<(String, usize)> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Str(s) => Ok((s, tok.line)),
            _ => Err(self.unexpected(&tok, what)),
        }
    }

    /// A stanza must be followed by a line break or the closing `end`.
    fn end_of_stanza(&mut self) -> Result<()> {
        let tok = self.peek().clone();
        match &tok.kind {
            TokenKind::Newline => {
                self.pos += 1;
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            TokenKind::Ident(w) if w == "end" => Ok(()),
            _ => Err(self.unexpected(&tok, "end of line")),
        }
    }

    fn value(&mut self) -> Result<Value> {
        let tok = self.advance();
        match tok.kind {
            TokenKind::Str(s) => Ok(Value::Str(s)),
            TokenKind::Symbol(s) => Ok(Value::Symbol(s)),
            TokenKind::LBracket => {
                let mut items = Vec::new();
                loop {
                    self.skip_newlines();
                    let tok = self.advance();
                    match tok.kind {
                        TokenKind::RBracket => break,
                        TokenKind::Str(s) => {
                            items.push(s);
                            self.skip_newlines();
                            let next = self.peek().clone();
                            match next.kind {
                                TokenKind::Comma => self.pos += 1,
                                TokenKind::RBracket => {}
                                _ => return Err(self.unexpected(&next, "',' or ']'")),
                            }
                        }
                        _ => return Err(self.unexpected(&tok, "a string or ']'")),
                    }
                }
                Ok(Value::List(items))
            }
            _ => Err(self.unexpected(&tok, "a value")),
        }
    }

    /// `key: value, key: value` as used by `uninstall` and `zap`.
    fn keyword_args(&mut self) -> Result<Vec<(String, usize, Value)>> {
        let mut args = Vec::new();
        loop {
            let tok = self.advance();
            let TokenKind::Key(key) = tok.kind else {
                return Err(self.unexpected(&tok, "a keyword argument"));
            };
            let value = self.value()?;
            args.push((key, tok.line, value));
            if self.peek().kind == TokenKind::Comma {
                self.pos += 1;
                self.skip_newlines();
            } else {
                return Ok(args);
            }
        }
    }

    fn string_list(&self, value: Value, line: usize, what: &str) -> Result<Vec<String>> {
        match value {
            Value::Str(s) => Ok(vec![s]),
            Value::List(items) => Ok(items),
            Value::Symbol(_) => Err(self.error(line, format!("{what} expects a string or array"))),
        }
    }

    fn checksum(&self, value: Value, line: usize) -> Result<Checksum> {
        let raw = match value {
            Value::Str(s) | Value::Symbol(s) => s,
            Value::List(_) => return Err(self.error(line, "sha256 expects a single value")),
        };
        Checksum::parse(&raw).map_err(|e| self.error(line, e.to_string()))
    }

    fn set_once<T>(&self, slot: &mut Option<T>, value: T, line: usize, stanza: &str) -> Result<()> {
        if slot.is_some() {
            return Err(self.error(line, format!("duplicate '{stanza}' stanza")));
        }
        *slot = Some(value);
        Ok(())
    }

    fn file(&mut self) -> Result<Vec<Manifest>> {
        let mut manifests = Vec::new();
        loop {
            self.skip_newlines();
            if self.peek().kind == TokenKind::Eof {
                break;
            }
            manifests.push(self.cask()?);
        }
        if manifests.is_empty() {
            return Err(self.error(1, "no cask block found"));
        }
        Ok(manifests)
    }

    /// Stanzas inside `on_arm do ... end` and friends.
    fn source_block(&mut self, arch: Arch, line: usize) -> Result<SourceDraft> {
        self.expect_ident("do")?;
        self.end_of_stanza()?;
        let mut draft = SourceDraft {
            line,
            ..SourceDraft::default()
        };
        loop {
            self.skip_newlines();
            let tok = self.advance();
            let TokenKind::Ident(word) = &tok.kind else {
                return Err(self.unexpected(&tok, "a stanza"));
            };
            match word.as_str() {
                "end" => break,
                "url" => {
                    let (url, _) = self.expect_string("a URL string")?;
                    self.set_once(&mut draft.url, url, tok.line, "url")?;
                }
                "sha256" => {
                    let value = self.value()?;
                    let checksum = self.checksum(value, tok.line)?;
                    self.set_once(&mut draft.checksum, checksum, tok.line, "sha256")?;
                }
                other => {
                    return Err(self.error(
                        tok.line,
                        format!("unsupported stanza '{other}' in {} block", arch.block_name()),
                    ));
                }
            }
            self.end_of_stanza()?;
        }
        Ok(draft)
    }

    fn livecheck_block(&mut self, line: usize) -> Result<Livecheck> {
        self.expect_ident("do")?;
        self.end_of_stanza()?;
        let mut url = None;
        let mut strategy = None;
        loop {
            self.skip_newlines();
            let tok = self.advance();
            let TokenKind::Ident(word) = &tok.kind else {
                return Err(self.unexpected(&tok, "a livecheck stanza"));
            };
            match word.as_str() {
                "end" => break,
                "url" => {
                    let (value, _) = self.expect_string("a feed URL")?;
                    self.set_once(&mut url, value, tok.line, "url")?;
                }
                "strategy" => {
                    let next = self.advance();
                    let TokenKind::Symbol(sym) = next.kind else {
                        return Err(self.unexpected(&next, "a strategy symbol"));
                    };
                    self.set_once(
                        &mut strategy,
                        LivecheckStrategy::from_symbol(&sym),
                        tok.line,
                        "strategy",
                    )?;
                }
                other => {
                    return Err(self.error(
                        tok.line,
                        format!("unsupported stanza '{other}' in livecheck block"),
                    ));
                }
            }
            self.end_of_stanza()?;
        }
        let url = url.ok_or_else(|| self.error(line, "livecheck block has no url"))?;
        Ok(Livecheck {
            url,
            strategy: strategy.unwrap_or(LivecheckStrategy::PageMatch),
        })
    }

    fn cask(&mut self) -> Result<Manifest> {
        let head = self.expect_ident("cask")?;
        let (raw_token, token_line) = self.expect_string("the cask token")?;
        let token =
            CaskToken::new(&raw_token).map_err(|e| self.error(token_line, e.to_string()))?;
        self.expect_ident("do")?;
        self.end_of_stanza()?;

        let mut version = None;
        let mut name = Vec::new();
        let mut desc = None;
        let mut homepage = None;
        let mut app = None;
        let mut uninstall: Option<Uninstall> = None;
        let mut zap: Option<Zap> = None;
        let mut livecheck = None;
        let mut agnostic = SourceDraft {
            line: head.line,
            ..SourceDraft::default()
        };
        let mut arch_drafts: Vec<(Arch, SourceDraft)> = Vec::new();

        loop {
            self.skip_newlines();
            let tok = self.advance();
            let word = match &tok.kind {
                TokenKind::Ident(w) => w.clone(),
                TokenKind::Eof => {
                    return Err(self.error(head.line, format!("cask '{token}' is missing 'end'")));
                }
                _ => return Err(self.unexpected(&tok, "a stanza")),
            };
            let line = tok.line;

            match word.as_str() {
                "end" => break,
                "version" => {
                    let v = match self.value()? {
                        Value::Str(s) => Version::new(&s),
                        Value::Symbol(s) if s == Version::LATEST => Version::new(Version::LATEST),
                        _ => return Err(self.error(line, "version expects a string or :latest")),
                    };
                    if v.is_empty() {
                        return Err(self.error(line, "version must not be empty"));
                    }
                    self.set_once(&mut version, v, line, "version")?;
                }
                "name" => {
                    let (value, _) = self.expect_string("a display name")?;
                    name.push(value);
                }
                "desc" => {
                    let (value, _) = self.expect_string("a description")?;
                    self.set_once(&mut desc, collapse_whitespace(&value), line, "desc")?;
                }
                "homepage" => {
                    let (value, _) = self.expect_string("a homepage URL")?;
                    self.set_once(&mut homepage, value, line, "homepage")?;
                }
                "url" => {
                    let (value, _) = self.expect_string("a URL string")?;
                    if agnostic.is_empty() {
                        agnostic.line = line;
                    }
                    self.set_once(&mut agnostic.url, value, line, "url")?;
                }
                "sha256" => {
                    let value = self.value()?;
                    let checksum = self.checksum(value, line)?;
                    if agnostic.is_empty() {
                        agnostic.line = line;
                    }
                    self.set_once(&mut agnostic.checksum, checksum, line, "sha256")?;
                }
                "app" => {
                    let (value, _) = self.expect_string("an app bundle name")?;
                    check_app_name(&value).map_err(|reason| self.error(line, reason))?;
                    self.set_once(&mut app, value, line, "app")?;
                }
                "uninstall" => {
                    let mut directive = Uninstall::default();
                    for (key, key_line, value) in self.keyword_args()? {
                        match key.as_str() {
                            "quit" => directive
                                .quit
                                .extend(self.string_list(value, key_line, "quit")?),
                            other => {
                                return Err(self.error(
                                    key_line,
                                    format!("unsupported uninstall directive '{other}'"),
                                ));
                            }
                        }
                    }
                    self.set_once(&mut uninstall, directive, line, "uninstall")?;
                }
                "zap" => {
                    let mut directive = Zap::default();
                    for (key, key_line, value) in self.keyword_args()? {
                        match key.as_str() {
                            "trash" => directive
                                .trash
                                .extend(self.string_list(value, key_line, "trash")?),
                            other => {
                                return Err(self.error(
                                    key_line,
                                    format!("unsupported zap directive '{other}'"),
                                ));
                            }
                        }
                    }
                    self.set_once(&mut zap, directive, line, "zap")?;
                }
                "livecheck" => {
                    let block = self.livecheck_block(line)?;
                    self.set_once(&mut livecheck, block, line, "livecheck")?;
                }
                block => {
                    let Some(arch) = Arch::from_block_name(block) else {
                        return Err(self.error(line, format!("unknown stanza '{block}'")));
                    };
                    if arch_drafts.iter().any(|(a, _)| *a == arch) {
                        return Err(self.error(line, format!("duplicate '{block}' block")));
                    }
                    let draft = self.source_block(arch, line)?;
                    arch_drafts.push((arch, draft));
                }
            }
            self.end_of_stanza()?;
        }

        let location = self.location(head.line);
        let version = version.ok_or_else(|| {
            CaskError::malformed(location.clone(), format!("cask '{token}' has no version"))
        })?;

        let mut sources = Vec::new();
        let drafts = std::iter::once((None, agnostic))
            .chain(arch_drafts.into_iter().map(|(a, d)| (Some(a), d)));
        for (arch, draft) in drafts {
            if draft.is_empty() {
                continue;
            }
            let scope = arch.map_or("top-level", |a| a.block_name());
            match (draft.url, draft.checksum) {
                (Some(url), Some(checksum)) => sources.push(Source {
                    url,
                    arch,
                    checksum,
                }),
                (Some(_), None) => {
                    return Err(self.error(draft.line, format!("{scope} source has no sha256")));
                }
                (None, _) => {
                    return Err(self.error(draft.line, format!("{scope} source has no url")));
                }
            }
        }
        if sources.is_empty() {
            return Err(CaskError::malformed(
                location,
                format!("cask '{token}' declares no source url"),
            ));
        }
        if app.is_none() && uninstall.is_none() {
            return Err(CaskError::malformed(
                location,
                format!("cask '{token}' declares neither an app nor an uninstall directive"),
            ));
        }

        debug!(cask = %token, sources = sources.len(), "parsed manifest");

        Ok(Manifest {
            token,
            version,
            name,
            desc,
            homepage,
            sources,
            app,
            uninstall,
            zap,
            livecheck,
            location,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::{LETTA, MUFFON, POSTGRES, POSTGRES_ARM};
    use super::*;

    fn reason(err: CaskError) -> String {
        match err {
            CaskError::MalformedManifest { reason, .. } => reason,
            other => panic!("expected MalformedManifest, got {other:?}"),
        }
    }

    #[test]
    fn parses_muffon() {
        let m = Manifest::parse(MUFFON).unwrap();
        assert_eq!(m.token, "muffon");
        assert_eq!(m.version, "2.2.0");
        assert_eq!(m.sources.len(), 2);
        assert_eq!(m.sources[0].arch, Some(Arch::Arm64));
        assert_eq!(m.sources[1].arch, Some(Arch::X86_64));
        assert!(m.sources[0].url.contains("#{version}"));
        assert_eq!(m.app.as_deref(), Some("muffon.app"));
        assert_eq!(m.uninstall.unwrap().quit, vec!["dev.thesolog.muffon"]);
        assert_eq!(m.zap.unwrap().trash.len(), 4);
        assert_eq!(
            m.livecheck.unwrap().strategy,
            LivecheckStrategy::GithubLatest
        );
        assert_eq!(m.location.line, 1);
    }

    #[test]
    fn multiline_desc_is_collapsed() {
        let m = Manifest::parse(MUFFON).unwrap();
        assert_eq!(
            m.desc.as_deref(),
            Some(
                "A music streaming client for desktop, which helps you listen to, discover and organize music in an advanced way"
            )
        );
    }

    #[test]
    fn parses_agnostic_source() {
        let m = Manifest::parse(POSTGRES).unwrap();
        assert_eq!(m.sources.len(), 1);
        assert_eq!(m.sources[0].arch, None);
        assert_eq!(m.supported_arches(), Arch::ALL.to_vec());
        assert_eq!(m.display_name(), "postgres");
    }

    #[test]
    fn no_check_symbol() {
        let m = Manifest::parse(POSTGRES_ARM).unwrap();
        assert!(m.sources[0].checksum.is_no_check());
        assert_eq!(m.supported_arches(), vec![Arch::Arm64]);
    }

    #[test]
    fn stanza_order_does_not_matter() {
        let m = Manifest::parse(LETTA).unwrap();
        assert_eq!(m.display_name(), "Letta Desktop");
        assert_eq!(m.homepage.as_deref(), Some("https://letta.com/"));
    }

    #[test]
    fn missing_version() {
        let text = LETTA.replace("  version \"0.7.0\"\n", "");
        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("no version"));
    }

    #[test]
    fn missing_sources() {
        let text = r#"cask "x" do
  version "1.0"
  app "X.app"
end"#;
        assert!(reason(Manifest::parse(text).unwrap_err()).contains("no source url"));
    }

    #[test]
    fn url_without_checksum() {
        let text = r#"cask "x" do
  version "1.0"
  on_intel do
    url "https://example.com/x.dmg"
  end
  app "X.app"
end"#;
        let err = Manifest::parse(text).unwrap_err();
        let CaskError::MalformedManifest { location, reason } = err else {
            panic!("wrong error");
        };
        assert_eq!(reason, "on_intel source has no sha256");
        assert_eq!(location.line, 3);
    }

    #[test]
    fn short_digest_is_rejected() {
        let text = r#"cask "x" do
  version "1.0"
  url "https://example.com/x.dmg"
  sha256 "abc123"
  app "X.app"
end"#;
        assert!(reason(Manifest::parse(text).unwrap_err()).contains("64 hex"));
    }

    #[test]
    fn needs_app_or_uninstall() {
        let text = r#"cask "x" do
  version "1.0"
  url "https://example.com/x.dmg"
  sha256 :no_check
end"#;
        assert!(reason(Manifest::parse(text).unwrap_err()).contains("neither an app"));

        let uninstall_only = text.replace("end", "  uninstall quit: [\"a.b\", \"c.d\"]\nend");
        let m = Manifest::parse(&uninstall_only).unwrap();
        assert_eq!(m.uninstall.unwrap().quit, vec!["a.b", "c.d"]);
    }

    #[test]
    fn app_must_be_a_bundle_name() {
        for bad in ["/", "../../Users", "Apps/Letta.app", "..", ""] {
            let text = LETTA.replace("\"Letta Desktop.app\"", &format!("\"{bad}\""));
            let err = reason(Manifest::parse(&text).unwrap_err());
            assert!(err.starts_with("app "), "{bad:?}: {err}");
        }
    }

    #[test]
    fn prefixed_digest_is_rejected() {
        let text = POSTGRES.replace(
            "sha256 \"b52fa",
            "sha256 \"sha256:b52fa",
        );
        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("64 hex"));
    }

    #[test]
    fn unknown_stanza() {
        let text = LETTA.replace("app \"Letta Desktop.app\"", "pkg \"Letta.pkg\"");
        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("unknown stanza 'pkg'"));
    }

    #[test]
    fn duplicate_blocks_and_stanzas() {
        let text = MUFFON.replace("on_intel do", "on_arm do");
        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("duplicate 'on_arm'"));

        let text = LETTA.replace("app \"Letta Desktop.app\"", "app \"A.app\"\n  app \"B.app\"");
        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("duplicate 'app'"));
    }

    #[test]
    fn parse_all_reads_every_block() {
        let text = format!("{LETTA}\n\n{POSTGRES}");
        let all = parse_all(&text, None).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].token, "postgres");
        assert!(all[1].location.line > 1);

        assert!(reason(Manifest::parse(&text).unwrap_err()).contains("exactly one"));
    }

    #[test]
    fn empty_text() {
        assert!(reason(Manifest::parse("# nothing here\n").unwrap_err()).contains("no cask"));
    }

    #[test]
    fn missing_end() {
        let text = LETTA.trim_end().trim_end_matches("end");
        assert!(reason(Manifest::parse(text).unwrap_err()).contains("missing 'end'"));
    }

    #[test]
    fn version_latest() {
        let text = POSTGRES_ARM.replace("version \"2.8.2-17\"", "version :latest");
        let m = Manifest::parse(&text).unwrap();
        assert!(m.version.is_latest());
    }

    #[test]
    fn from_file_records_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("letta.rb");
        std::fs::write(&path, LETTA).unwrap();
        let m = Manifest::from_file(&path).unwrap();
        assert_eq!(m.location.path.as_deref(), Some(path.as_path()));
    }
}
