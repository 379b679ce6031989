use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::engine::{NavError, NavigationEngine, Transition, ViewState};
use crate::tree::ArticleId;

// ---------------------------------------------------------------------------
// Article resolution
// ---------------------------------------------------------------------------

/// Whatever knows how to actually open a help article.
pub trait ArticleResolver {
    fn open(&mut self, article: &ArticleId) -> Result<()>;
}

/// Default resolver: there is no knowledge base behind the terminal, so
/// opening an article only records that it happened.
#[derive(Debug, Default)]
pub struct ConsoleResolver;

impl ArticleResolver for ConsoleResolver {
    fn open(&mut self, article: &ArticleId) -> Result<()> {
        info!("Opening article: {article}");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Operator input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Hotkey(char),
    /// 0-based position, typed as `#N` or a multi-digit number.
    Select(usize),
    Repeat,
    Back,
    Reset,
    Quit,
    Unknown(String),
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut chars = line.chars();
        if let (Some(key), None) = (chars.next(), chars.next()) {
            return Command::Hotkey(key);
        }
        let digits = line.strip_prefix('#').unwrap_or(line);
        match digits.parse::<usize>() {
            Ok(number) if number > 0 => return Command::Select(number - 1),
            _ => {}
        }
        match line.to_lowercase().as_str() {
            "" | "repeat" => Command::Repeat,
            "back" => Command::Back,
            "reset" => Command::Reset,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Console presenter
// ---------------------------------------------------------------------------

/// Terminal front end: renders views and turns typed lines into engine calls.
pub struct Console<R, W, A> {
    input: R,
    output: W,
    resolver: A,
}

impl<R: BufRead, W: Write, A: ArticleResolver> Console<R, W, A> {
    pub fn new(input: R, output: W, resolver: A) -> Self {
        Self {
            input,
            output,
            resolver,
        }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Drive `engine` until the operator quits or input runs out.
    pub fn run(&mut self, engine: &mut NavigationEngine) -> Result<()> {
        self.show_banner()?;
        let longest = engine.graph().longest_acyclic_path();
        self.render(&engine.current_view(), longest)?;

        loop {
            let Some(line) = self.read_line("> ")? else {
                break;
            };

            match Command::parse(&line) {
                Command::Hotkey(key) => {
                    let result = engine.select_hotkey(key);
                    self.handle_selection(engine, result, longest)?;
                }
                Command::Select(index) => {
                    let result = engine.select_option(index);
                    self.handle_selection(engine, result, longest)?;
                }
                Command::Repeat => {
                    let view = engine.repeat_current();
                    self.status(&format!("Repeat to customer: \"{}\"", view.prompt))?;
                }
                Command::Back => match engine.go_back() {
                    Ok(_) => self.render(&engine.current_view(), longest)?,
                    Err(NavError::NoHistory) => self.status("Already at the first question")?,
                    Err(err) => self.status(&err.to_string())?,
                },
                Command::Reset => {
                    if self.confirm(
                        "Are you sure you want to start over? This will reset the entire troubleshooting session.",
                    )? {
                        let view = engine.reset();
                        self.status("Started new troubleshooting session")?;
                        self.render(&view, longest)?;
                    }
                }
                Command::Quit => break,
                Command::Unknown(text) => {
                    warn!("Unrecognised input: {text:?}");
                    self.status(&format!("Unrecognised input \"{text}\""))?;
                }
            }
        }

        writeln!(self.output, "Session ended.")?;
        Ok(())
    }

    fn show_banner(&mut self) -> Result<()> {
        writeln!(self.output, "========================================")?;
        writeln!(self.output, "   AGENT TROUBLESHOOTING ASSISTANT")?;
        writeln!(self.output, "========================================")?;
        Ok(())
    }

    fn handle_selection(
        &mut self,
        engine: &NavigationEngine,
        result: Result<Transition, NavError>,
        longest: Option<usize>,
    ) -> Result<()> {
        match result {
            Ok(Transition::Advanced(_)) => self.render(&engine.current_view(), longest),
            Ok(Transition::ArticleRequested(article)) => {
                self.handle_article(&article)?;
                self.render(&engine.current_view(), longest)
            }
            Err(err) => self.status(&err.to_string()),
        }
    }

    /// `longest` is only a hint; past it (the graph looped) the plain step is shown.
    fn render(&mut self, view: &ViewState, longest: Option<usize>) -> Result<()> {
        writeln!(self.output)?;
        match longest {
            Some(longest) if view.step_index <= longest => {
                writeln!(self.output, "Step {} of up to {longest}", view.step_index)?
            }
            _ => writeln!(self.output, "Step {}", view.step_index)?,
        }
        writeln!(self.output, "{}", view.prompt)?;
        if !view.guidance.is_empty() {
            writeln!(self.output, "  ({})", view.guidance)?;
        }
        for (index, option) in view.options.iter().enumerate() {
            match option.hotkey {
                Some(key) => writeln!(self.output, "  [{key}] {}", option.label)?,
                None => writeln!(self.output, "  [#{}] {}", index + 1, option.label)?,
            }
        }

        let mut controls = vec!["<enter> repeat"];
        if view.can_go_back {
            controls.push("back");
        }
        controls.extend(["reset", "quit"]);
        writeln!(self.output, "  {}", controls.join(" | "))?;
        Ok(())
    }

    fn handle_article(&mut self, article: &ArticleId) -> Result<()> {
        self.status(&format!("Redirecting to article: {article}"))?;
        if self.confirm(&format!("Open the article \"{article}\"?"))? {
            match self.resolver.open(article) {
                Ok(()) => self.status(&format!("Article \"{article}\" opened"))?,
                Err(err) => {
                    warn!("Failed to open article {article}: {err:#}");
                    self.status(&format!("Could not open article \"{article}\": {err}"))?;
                }
            }
        }
        Ok(())
    }

    fn status(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "-- {message}")?;
        Ok(())
    }

    fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.read_line(&format!("{question} [y/N] "))?;
        Ok(matches!(
            answer.as_deref().map(str::trim),
            Some("y") | Some("Y") | Some("yes")
        ))
    }

    /// `None` once input is exhausted.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        write!(self.output, "{prompt}")?;
        self.output.flush()?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read operator input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    }
}
