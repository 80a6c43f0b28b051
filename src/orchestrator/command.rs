//! 交互命令解析
//!
//! 每行一条命令，题号从 1 开始

use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::models::OptionLabel;
use crate::services::Direction;
use crate::workflow::ParseMode;

pub const HELP: &str = "\
可用命令（题号从 1 开始）:
  extract <图片>           从图片中提取题目（jpg/png/webp/gif）
  text <文件>              用 LLM 整理文本文件中的题目
  load [--raw] <文件>      直接解析本地文本（--raw: 无 Question: 标记）
  q <题干>                 修改当前表单的题干
  opt <A-D> [内容]         修改选项，内容为空则清空
  show                     显示当前表单
  add                      把草稿添加为新题目
  list                     列出所有题目
  edit <n>                 编辑第 n 题
  save                     保存编辑
  cancel                   取消编辑
  delete <n>               删除第 n 题
  up <n> / down <n>        上移 / 下移第 n 题
  translate <n> <语言>     翻译第 n 题
  export [文件名]          导出 PDF
  help                     显示帮助
  quit                     退出";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Extract(PathBuf),
    Text(PathBuf),
    Load { path: PathBuf, mode: ParseMode },
    SetQuestion(String),
    SetOption { label: OptionLabel, text: String },
    Show,
    Add,
    List,
    Edit(usize),
    Save,
    Cancel,
    Delete(usize),
    Move { number: usize, direction: Direction },
    Translate { number: usize, language: String },
    Export(Option<String>),
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("空命令")]
    Empty,
    #[error("未知命令: {0}（输入 help 查看帮助）")]
    Unknown(String),
    #[error("命令 {command} 缺少参数: {argument}")]
    MissingArgument {
        command: &'static str,
        argument: &'static str,
    },
    #[error("无效的题号: {0}")]
    InvalidNumber(String),
    #[error("无效的选项标签: {0}（应为 A-D）")]
    InvalidLabel(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(CommandError::Empty);
        }
        let (head, rest) = match line.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (line, ""),
        };

        let command = match head.to_ascii_lowercase().as_str() {
            "extract" => Command::Extract(path_arg("extract", rest)?),
            "text" => Command::Text(path_arg("text", rest)?),
            "load" => match rest
                .strip_prefix("--raw")
                .filter(|path| path.is_empty() || path.starts_with(char::is_whitespace))
            {
                Some(path) => Command::Load {
                    path: path_arg("load", path.trim())?,
                    mode: ParseMode::Raw,
                },
                None => Command::Load {
                    path: path_arg("load", rest)?,
                    mode: ParseMode::Labeled,
                },
            },
            "q" | "question" => Command::SetQuestion(rest.to_string()),
            "opt" | "option" => {
                let (label, text) = match rest.split_once(char::is_whitespace) {
                    Some((label, text)) => (label, text.trim()),
                    None => (rest, ""),
                };
                if label.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "opt",
                        argument: "<A-D>",
                    });
                }
                let label = OptionLabel::parse(label)
                    .map_err(|_| CommandError::InvalidLabel(label.to_string()))?;
                Command::SetOption {
                    label,
                    text: text.to_string(),
                }
            }
            "show" => Command::Show,
            "add" => Command::Add,
            "list" | "ls" => Command::List,
            "edit" => Command::Edit(number_arg("edit", rest)?),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "delete" | "del" | "rm" => Command::Delete(number_arg("delete", rest)?),
            "up" => Command::Move {
                number: number_arg("up", rest)?,
                direction: Direction::Up,
            },
            "down" => Command::Move {
                number: number_arg("down", rest)?,
                direction: Direction::Down,
            },
            "translate" => {
                let (number, language) = rest.split_once(char::is_whitespace).ok_or(
                    CommandError::MissingArgument {
                        command: "translate",
                        argument: "<语言>",
                    },
                )?;
                Command::Translate {
                    number: number_arg("translate", number)?,
                    language: language.trim().to_string(),
                }
            }
            "export" => Command::Export(Some(rest.to_string()).filter(|s| !s.is_empty())),
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(CommandError::Unknown(other.to_string())),
        };
        Ok(command)
    }
}

fn path_arg(command: &'static str, rest: &str) -> Result<PathBuf, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "<文件>",
        });
    }
    Ok(PathBuf::from(rest))
}

fn number_arg(command: &'static str, rest: &str) -> Result<usize, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            argument: "<n>",
        });
    }
    rest.parse()
        .map_err(|_| CommandError::InvalidNumber(rest.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Command, CommandError> {
        line.parse()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("add"), Ok(Command::Add));
        assert_eq!(parse("  LIST "), Ok(Command::List));
        assert_eq!(parse("save"), Ok(Command::Save));
        assert_eq!(parse("quit"), Ok(Command::Quit));
        assert_eq!(parse(""), Err(CommandError::Empty));
        assert_eq!(parse("frobnicate"), Err(CommandError::Unknown("frobnicate".into())));
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse("edit 2"), Ok(Command::Edit(2)));
        assert_eq!(parse("delete 1"), Ok(Command::Delete(1)));
        assert_eq!(
            parse("down 3"),
            Ok(Command::Move {
                number: 3,
                direction: Direction::Down
            })
        );
        assert_eq!(parse("up x"), Err(CommandError::InvalidNumber("x".into())));
        assert_eq!(
            parse("edit"),
            Err(CommandError::MissingArgument {
                command: "edit",
                argument: "<n>"
            })
        );
    }

    #[test]
    fn test_parse_text_arguments_keep_spaces() {
        assert_eq!(
            parse("q What is  2+2?"),
            Ok(Command::SetQuestion("What is  2+2?".into()))
        );
        assert_eq!(
            parse("opt b Four  apples"),
            Ok(Command::SetOption {
                label: OptionLabel::B,
                text: "Four  apples".into()
            })
        );
        assert_eq!(
            parse("opt C"),
            Ok(Command::SetOption {
                label: OptionLabel::C,
                text: String::new()
            })
        );
        assert_eq!(parse("opt E x"), Err(CommandError::InvalidLabel("E".into())));
    }

    #[test]
    fn test_parse_translate_and_export() {
        assert_eq!(
            parse("translate 2 Simplified Chinese"),
            Ok(Command::Translate {
                number: 2,
                language: "Simplified Chinese".into()
            })
        );
        assert!(parse("translate 2").is_err());
        assert_eq!(parse("export"), Ok(Command::Export(None)));
        assert_eq!(parse("export my.pdf"), Ok(Command::Export(Some("my.pdf".into()))));
    }

    #[test]
    fn test_parse_load_modes() {
        assert_eq!(
            parse("load --raw scan.txt"),
            Ok(Command::Load {
                path: PathBuf::from("scan.txt"),
                mode: ParseMode::Raw
            })
        );
        assert_eq!(
            parse("load reply.txt"),
            Ok(Command::Load {
                path: PathBuf::from("reply.txt"),
                mode: ParseMode::Labeled
            })
        );
        assert_eq!(
            parse("load --rawfile.txt"),
            Ok(Command::Load {
                path: PathBuf::from("--rawfile.txt"),
                mode: ParseMode::Labeled
            })
        );
        assert_eq!(
            parse("load --raw"),
            Err(CommandError::MissingArgument {
                command: "load",
                argument: "<文件>"
            })
        );
        assert_eq!(
            parse("extract ~/q 1.png"),
            Ok(Command::Extract(PathBuf::from("~/q 1.png")))
        );
    }
}
