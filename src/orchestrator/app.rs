use std::fmt::Write as _;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::ImageData;
use crate::orchestrator::command::{Command, HELP};
use crate::services::{LlmService, PdfExporter, QuestionExtractor};
use crate::utils::logging::default_export_filename;
use crate::workflow::{ExtractionFlow, Session};

/// 命令执行结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Message(String),
    Quit,
}

impl Reply {
    fn msg(text: impl Into<String>) -> Self {
        Reply::Message(text.into())
    }
}

/// 应用主结构
///
/// 唯一持有会话状态的地方，逐条执行用户命令
pub struct App {
    config: Config,
    flow: ExtractionFlow,
    exporter: PdfExporter,
    session: Session,
}

impl App {
    /// 使用真实 LLM 服务初始化应用
    pub fn initialize(config: Config) -> Self {
        let extractor = Arc::new(LlmService::new(&config));
        Self::with_extractor(config, extractor)
    }

    pub fn with_extractor(config: Config, extractor: Arc<dyn QuestionExtractor>) -> Self {
        Self {
            exporter: PdfExporter::new(config.source_language.clone()),
            flow: ExtractionFlow::new(extractor),
            session: Session::new(),
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// 运行交互主循环，读到 EOF 或 quit 时结束
    pub async fn run(&mut self) -> Result<()> {
        println!("{}\n", HELP);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        prompt();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                prompt();
                continue;
            }

            match line.parse::<Command>() {
                Ok(command) => match self.execute(command).await {
                    Ok(Reply::Message(text)) => println!("{}", text),
                    Ok(Reply::Quit) => break,
                    Err(e) if e.is_validation() => warn!("⚠️ {}", e),
                    Err(e) => error!("❌ {}", e),
                },
                Err(e) => warn!("⚠️ {}", e),
            }
            prompt();
        }

        info!("👋 会话结束，共 {} 道题", self.session.store().len());
        Ok(())
    }

    /// 执行一条命令
    pub async fn execute(&mut self, command: Command) -> AppResult<Reply> {
        let reply = match command {
            Command::Extract(path) => {
                let image = ImageData::load(&path).await?;
                let draft = self.flow.extract_from_image(&image).await?;
                self.session.set_draft(draft);
                self.show_active_form()
            }
            Command::Text(path) => {
                let raw = read_text(&path).await?;
                let draft = self.flow.extract_from_text(&raw).await?;
                self.session.set_draft(draft);
                self.show_active_form()
            }
            Command::Load { path, mode } => {
                let text = read_text(&path).await?;
                self.session
                    .set_draft(ExtractionFlow::draft_from_text(&text, mode));
                self.show_active_form()
            }
            Command::SetQuestion(text) => {
                self.session.active_form_mut()?.set_question(text);
                self.show_active_form()
            }
            Command::SetOption { label, text } => {
                self.session.active_form_mut()?.set_option(label, &text);
                self.show_active_form()
            }
            Command::Show => self.show_active_form(),
            Command::Add => {
                let index = self.session.submit_new()?;
                Reply::msg(format!("✓ 已添加第 {} 题，共 {} 题", index + 1, self.session.store().len()))
            }
            Command::List => Reply::msg(render_list(&self.session)),
            Command::Edit(number) => {
                let index = self.session.index_of(number)?;
                self.session.begin_edit(index)?;
                self.show_active_form()
            }
            Command::Save => {
                let index = self.session.submit_edit()?;
                Reply::msg(format!("✓ 已保存第 {} 题", index + 1))
            }
            Command::Cancel => {
                let index = self.session.cancel_edit()?;
                Reply::msg(format!("已取消编辑第 {} 题", index + 1))
            }
            Command::Delete(number) => {
                let index = self.session.index_of(number)?;
                self.session.delete(index)?;
                Reply::msg(render_list(&self.session))
            }
            Command::Move { number, direction } => {
                let index = self.session.index_of(number)?;
                if !self.session.move_question(index, direction)? {
                    info!("第 {} 题已在边界，无需移动", number);
                }
                Reply::msg(render_list(&self.session))
            }
            Command::Translate { number, language } => {
                let index = self.session.index_of(number)?;
                let record = self.session.records()[index].clone();
                let translated = self.flow.translate_record(&record, &language).await?;
                self.session.replace(index, translated)?;
                Reply::msg(render_list(&self.session))
            }
            Command::Export(name) => {
                let path = self.export_path(name.as_deref());
                let written = self.exporter.export(self.session.records(), &path).await?;
                let size = tokio::fs::metadata(&written)
                    .await
                    .map_err(|e| AppError::export_write_failed(&written, e))?
                    .len();
                Reply::msg(format!("✓ PDF 已生成: {} ({} 字节)", written.display(), size))
            }
            Command::Help => Reply::msg(HELP),
            Command::Quit => Reply::Quit,
        };
        Ok(reply)
    }

    fn show_active_form(&self) -> Reply {
        let title = match self.session.edit_index() {
            Some(index) => format!("正在编辑第 {} 题", index + 1),
            None => "待添加的题目".to_string(),
        };
        match self.session.active_form() {
            Some(form) => Reply::msg(format!("—— {} ——\n{}", title, form)),
            None => Reply::msg("当前没有表单（extract / load 新题目，或 edit <n>）"),
        }
    }

    /// 相对路径放到导出目录下，缺少扩展名时补 `.pdf`
    fn export_path(&self, name: Option<&str>) -> PathBuf {
        let mut path = match name {
            Some(name) => PathBuf::from(name),
            None => PathBuf::from(default_export_filename()),
        };
        if path.extension().is_none() {
            path.set_extension("pdf");
        }
        if path.is_absolute() {
            path
        } else {
            self.config.export_dir.join(path)
        }
    }
}

async fn read_text(path: &Path) -> AppResult<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| AppError::ReadFailed {
            path: path.to_path_buf(),
            source,
        })
}

fn render_list(session: &Session) -> String {
    let records = session.records();
    if records.is_empty() {
        return "题目列表为空".to_string();
    }

    let mut out = format!("共 {} 道题:", records.len());
    for (i, record) in records.iter().enumerate() {
        let marker = if session.edit_index() == Some(i) { " [编辑中]" } else { "" };
        let _ = write!(out, "\n{}. {}{}", i + 1, record.question_text(), marker);
        if let Some(language) = record.language() {
            let _ = write!(out, " ({})", language);
        }
        for option in record.options() {
            let _ = write!(out, "\n   {}", option);
        }
    }
    out
}

fn prompt() {
    print!("> ");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExportError, ValidationError};
    use crate::models::OptionLabel;
    use crate::services::Direction;
    use crate::workflow::extraction_flow::tests::MockExtractor;
    use crate::workflow::ParseMode;

    fn app_with(response: &str, export_dir: &Path) -> App {
        let config = Config {
            export_dir: export_dir.to_path_buf(),
            ..Config::default()
        };
        App::with_extractor(config, MockExtractor::ok(response))
    }

    async fn run(app: &mut App, line: &str) -> AppResult<Reply> {
        app.execute(line.parse().unwrap()).await
    }

    fn texts(app: &App) -> Vec<String> {
        app.session()
            .records()
            .iter()
            .map(|r| r.question_text().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_extract_edit_add_flow() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("q.png");
        std::fs::write(&image, [0u8; 4]).unwrap();
        let mut app = app_with("Question: What is 2+2?\nA. 3\nB. 4\nC. 5\nD. 6", dir.path());

        run(&mut app, &format!("extract {}", image.display())).await.unwrap();
        run(&mut app, "opt D 22").await.unwrap();
        run(&mut app, "add").await.unwrap();

        let record = &app.session().records()[0];
        assert_eq!(record.question_text(), "What is 2+2?");
        assert_eq!(record.options(), ["A. 3", "B. 4", "C. 5", "D. 22"]);
        assert!(app.session().draft().is_none());
    }

    #[tokio::test]
    async fn test_add_without_question_is_validation_error() {
        let dir = tempfile::tempdir().unwrap();
        let reply_file = dir.path().join("reply.txt");
        std::fs::write(&reply_file, "A. only\nB. options").unwrap();
        let mut app = app_with("", dir.path());

        run(&mut app, &format!("load {}", reply_file.display())).await.unwrap();
        let err = run(&mut app, "add").await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Validation(ValidationError::EmptyQuestionText)
        ));

        run(&mut app, "q Now with a question").await.unwrap();
        run(&mut app, "add").await.unwrap();
        assert_eq!(texts(&app), vec!["Now with a question"]);
    }

    #[tokio::test]
    async fn test_manage_list() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with("", dir.path());
        for q in ["one", "two", "three"] {
            let file = dir.path().join(format!("{}.txt", q));
            std::fs::write(&file, format!("Question: {}", q)).unwrap();
            run(&mut app, &format!("load {}", file.display())).await.unwrap();
            run(&mut app, "add").await.unwrap();
        }

        run(&mut app, "up 1").await.unwrap();
        run(&mut app, "down 3").await.unwrap();
        assert_eq!(texts(&app), vec!["one", "two", "three"]);

        run(&mut app, "down 1").await.unwrap();
        assert_eq!(texts(&app), vec!["two", "one", "three"]);

        run(&mut app, "edit 3").await.unwrap();
        run(&mut app, "q three!").await.unwrap();
        run(&mut app, "opt a yes").await.unwrap();
        assert!(matches!(
            run(&mut app, "add").await,
            Err(AppError::Validation(ValidationError::EditInProgress { number: 3 }))
        ));
        run(&mut app, "save").await.unwrap();
        assert_eq!(texts(&app), vec!["two", "one", "three!"]);
        assert_eq!(app.session().records()[2].options(), ["A. yes"]);

        run(&mut app, "delete 1").await.unwrap();
        assert_eq!(texts(&app), vec!["one", "three!"]);

        assert!(matches!(
            run(&mut app, "delete 3").await,
            Err(AppError::Validation(ValidationError::NumberOutOfRange { number: 3, len: 2 }))
        ));
    }

    #[tokio::test]
    async fn test_translate_command() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("q.txt");
        std::fs::write(&file, "Question: Hello?\nA. Yes").unwrap();
        let mut app = app_with("Question: Bonjour ?\nA. Oui", dir.path());

        run(&mut app, &format!("load {}", file.display())).await.unwrap();
        run(&mut app, "add").await.unwrap();
        run(&mut app, "translate 1 French").await.unwrap();

        let record = &app.session().records()[0];
        assert_eq!(record.question_text(), "Bonjour ?");
        assert_eq!(record.language(), Some("French"));
    }

    #[tokio::test]
    async fn test_export_command_writes_into_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("q.txt");
        std::fs::write(&file, "Question: Q1\nA. x").unwrap();
        let export_dir = dir.path().join("exports");
        let mut app = app_with("", &export_dir);

        assert!(matches!(
            run(&mut app, "export").await,
            Err(AppError::Export(ExportError::EmptyList))
        ));

        run(&mut app, &format!("load {}", file.display())).await.unwrap();
        run(&mut app, "add").await.unwrap();
        let reply = run(&mut app, "export paper").await.unwrap();

        let expected = export_dir.join("paper.pdf");
        assert!(expected.exists());
        assert!(matches!(reply, Reply::Message(m) if m.contains("paper.pdf")));
    }

    #[tokio::test]
    async fn test_option_command_without_form() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with("", dir.path());

        let err = app
            .execute(Command::SetOption {
                label: OptionLabel::A,
                text: "x".into(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(ValidationError::NoDraft)));
    }

    #[tokio::test]
    async fn test_move_out_of_bounds_is_silent() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("q.txt");
        std::fs::write(&file, "Question: only").unwrap();
        let mut app = app_with("", dir.path());
        run(&mut app, &format!("load {}", file.display())).await.unwrap();
        run(&mut app, "add").await.unwrap();

        let reply = app
            .execute(Command::Move {
                number: 1,
                direction: Direction::Up,
            })
            .await
            .unwrap();
        assert!(matches!(reply, Reply::Message(_)));
        assert_eq!(texts(&app), vec!["only"]);
    }

    #[test]
    fn test_export_path() {
        let dir = tempfile::tempdir().unwrap();
        let app = app_with("", dir.path());

        assert_eq!(app.export_path(Some("a.pdf")), dir.path().join("a.pdf"));
        assert_eq!(app.export_path(Some("sub/b")), dir.path().join("sub/b.pdf"));
        assert_eq!(app.export_path(Some("/abs/c.pdf")), PathBuf::from("/abs/c.pdf"));

        let default = app.export_path(None);
        assert!(default.starts_with(dir.path()));
        assert_eq!(default.extension().and_then(|e| e.to_str()), Some("pdf"));
    }

    #[test]
    fn test_render_list_marks_edit() {
        let mut session = Session::new();
        assert_eq!(render_list(&session), "题目列表为空");

        session.set_draft(ExtractionFlow::draft_from_text("Question: Q\nA. x", ParseMode::Labeled));
        session.submit_new().unwrap();
        session.begin_edit(0).unwrap();

        assert_eq!(render_list(&session), "共 1 道题:\n1. Q [编辑中]\n   A. x");
    }
}
