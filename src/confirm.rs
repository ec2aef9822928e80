//! Operator confirmation for destructive actions
//!
//! The remover never reads the terminal itself; it asks a [`Confirm`]
//! implementation, so the answer can come from stdin, a CLI flag or a test.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// 同意とみなす唯一の回答
pub const YES: &str = "yes";

/// yes/no の判断を返すもの
pub trait Confirm {
    /// 操作者が `prompt` に同意したときだけ true
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<C: Confirm + ?Sized> Confirm for &mut C {
    fn confirm(&mut self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

impl<C: Confirm + ?Sized> Confirm for Box<C> {
    fn confirm(&mut self, prompt: &str) -> bool {
        (**self).confirm(prompt)
    }
}

/// 空白区切りの最初のトークンがちょうど "yes" なら true
pub fn is_yes(answer: &str) -> bool {
    answer.split_whitespace().next() == Some(YES)
}

/// `output` に質問を書き、`input` から回答を読む
pub struct PromptConfirm<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptConfirm<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// トークンのある行まで読む（EOF や読み取りエラーは None）
    fn read_token(&mut self) -> Option<String> {
        let mut line = String::new();
        loop {
            line.clear();
            match self.input.read_line(&mut line) {
                Ok(0) | Err(_) => return None,
                Ok(_) => {
                    if let Some(token) = line.split_whitespace().next() {
                        return Some(token.to_string());
                    }
                }
            }
        }
    }
}

impl<R: BufRead, W: Write> Confirm for PromptConfirm<R, W> {
    fn confirm(&mut self, prompt: &str) -> bool {
        let _ = write!(self.output, "{} (yes/no): ", prompt);
        let _ = self.output.flush();
        match self.read_token() {
            Some(token) => is_yes(&token),
            None => {
                let _ = writeln!(self.output);
                false
            }
        }
    }
}

/// stdout に質問し、stdin から回答を読む
///
/// stdin のロックは1回の質問の間だけ保持するので、対話シェルは
/// 同じバッファ付きハンドルからコマンド行を読み続けられる。
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        PromptConfirm::new(io::stdin().lock(), io::stdout()).confirm(prompt)
    }
}

/// すべてに同意（`--yes`）
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _prompt: &str) -> bool {
        true
    }
}

/// すべて拒否（`--no`）
pub struct AssumeNo;

impl Confirm for AssumeNo {
    fn confirm(&mut self, _prompt: &str) -> bool {
        false
    }
}

/// 用意した回答を順に返し、表示された質問を記録する
#[derive(Debug, Default)]
pub struct ScriptedConfirm {
    answers: VecDeque<String>,
    pub prompts: Vec<String>,
}

impl ScriptedConfirm {
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            prompts: Vec::new(),
        }
    }
}

impl Confirm for ScriptedConfirm {
    fn confirm(&mut self, prompt: &str) -> bool {
        self.prompts.push(prompt.to_string());
        self.answers
            .pop_front()
            .map(|answer| is_yes(&answer))
            .unwrap_or(false)
    }
}
