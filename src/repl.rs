use std::borrow::Cow;
use std::fs;

use anyhow::{Context, Result};
use nu_ansi_term::{Color, Style};
use reedline::{
    EditCommand, Emacs, FileBackedHistory, KeyCode, KeyModifiers, PromptEditMode,
    PromptHistorySearch, Reedline, ReedlineEvent, StyledText, ValidationResult,
};
use rill_syntax::lexer::{self, TokenKind};

pub fn editor() -> Result<Reedline> {
    let mut keybindings = reedline::default_emacs_keybindings();
    keybindings.add_binding(
        KeyModifiers::ALT,
        KeyCode::Enter,
        ReedlineEvent::Edit(vec![EditCommand::InsertNewline]),
    );

    let data_dir = dirs::data_dir().context("could not find data directory")?.join("rill");
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("could not create data directory: {}", data_dir.display()))?;
    let history_path = data_dir.join("history.txt");
    let history = Box::new(
        FileBackedHistory::with_file(10000, history_path.clone())
            .with_context(|| format!("could not open history file: {}", history_path.display()))?,
    );

    let editor = Reedline::create()
        .with_edit_mode(Box::new(Emacs::new(keybindings)))
        .with_highlighter(Box::new(Highlighter))
        .with_history(history)
        .with_validator(Box::new(Validator));
    Ok(editor)
}

// Colors loosely follow base16-google-dark, using the high-intensity variant
// of each color.
const DEFAULT: Color = Color::LightGray;
const COMMENT: Color = Color::DarkGray;
const CONSTANT: Color = Color::LightCyan;
const FUNCTION: Color = Color::LightBlue;
const KEYWORD: Color = Color::LightPurple;
const STRING: Color = Color::LightGreen;
const VARIABLE: Color = Color::LightRed;

/// Colors a line using the lexer. Text between tokens (whitespace, comments
/// and anything unrecognized) is dimmed.
struct Highlighter;

impl reedline::Highlighter for Highlighter {
    fn highlight(&self, line: &str, _: usize) -> StyledText {
        let mut output = StyledText::new();
        let (tokens, _) = lexer::scan(line);

        let mut curr_end = 0;
        for (idx, token) in tokens.iter().enumerate() {
            let range = token.span.range();
            if range.start > curr_end {
                output.push((Style::new().fg(COMMENT), line[curr_end..range.start].to_string()));
            }
            let next = tokens.get(idx + 1).map(|token| token.kind);
            let fg = match token.kind {
                TokenKind::False | TokenKind::Nil | TokenKind::Number | TokenKind::True => CONSTANT,
                TokenKind::Identifier if next == Some(TokenKind::LtParen) => FUNCTION,
                TokenKind::Identifier => VARIABLE,
                TokenKind::String => STRING,
                kind if kind.is_keyword() => KEYWORD,
                _ => DEFAULT,
            };
            if range.end > range.start {
                output.push((Style::new().fg(fg), line[range.clone()].to_string()));
            }
            curr_end = curr_end.max(range.end);
        }
        if curr_end < line.len() {
            output.push((Style::new().fg(COMMENT), line[curr_end..].to_string()));
        }

        output
    }
}

/// Keeps reading lines until the input parses, or fails for a reason other
/// than ending too early.
struct Validator;

impl reedline::Validator for Validator {
    fn validate(&self, line: &str) -> ValidationResult {
        if rill_syntax::is_complete(line) {
            ValidationResult::Complete
        } else {
            ValidationResult::Incomplete
        }
    }
}

pub struct Prompt;

impl reedline::Prompt for Prompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed(">>> ")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _: PromptEditMode) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("... ")
    }

    fn render_prompt_history_search_indicator(&self, _: PromptHistorySearch) -> Cow<str> {
        Cow::Borrowed("")
    }
}
