//! 会话状态 - 流程层
//!
//! 持有题目列表、新建草稿和编辑游标，保证：
//! - 同一时间最多一道题处于编辑状态
//! - 编辑中的索引始终指向列表内的有效位置（删除、移动时随之调整）
//!
//! 所有索引都是 0-based；错误信息里的题号是 1-based

use tracing::{debug, info};

use crate::error::ValidationError;
use crate::models::QuestionRecord;
use crate::services::question_store::{neighbor, Direction, QuestionStore};
use crate::workflow::question_draft::QuestionDraft;

/// 编辑游标：正在编辑的位置及其表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditState {
    pub index: usize,
    pub form: QuestionDraft,
}

/// 单个交互会话
#[derive(Debug, Default)]
pub struct Session {
    store: QuestionStore,
    draft: Option<QuestionDraft>,
    editing: Option<EditState>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &QuestionStore {
        &self.store
    }

    pub fn records(&self) -> &[QuestionRecord] {
        self.store.records()
    }

    pub fn draft(&self) -> Option<&QuestionDraft> {
        self.draft.as_ref()
    }

    /// 设置新的草稿，覆盖旧草稿
    pub fn set_draft(&mut self, draft: QuestionDraft) {
        self.draft = Some(draft);
    }

    pub fn editing(&self) -> Option<&EditState> {
        self.editing.as_ref()
    }

    pub fn edit_index(&self) -> Option<usize> {
        self.editing.as_ref().map(|e| e.index)
    }

    /// 1-based 题号转为索引
    pub fn index_of(&self, number: usize) -> Result<usize, ValidationError> {
        let index = number.checked_sub(1).ok_or(ValidationError::NumberOutOfRange {
            number,
            len: self.store.len(),
        })?;
        self.check_index(index)?;
        Ok(index)
    }

    fn check_index(&self, index: usize) -> Result<(), ValidationError> {
        if index < self.store.len() {
            Ok(())
        } else {
            Err(ValidationError::NumberOutOfRange {
                number: index + 1,
                len: self.store.len(),
            })
        }
    }

    /// 当前活动表单：编辑中为编辑表单，否则为草稿
    pub fn active_form(&self) -> Option<&QuestionDraft> {
        match &self.editing {
            Some(edit) => Some(&edit.form),
            None => self.draft.as_ref(),
        }
    }

    pub fn active_form_mut(&mut self) -> Result<&mut QuestionDraft, ValidationError> {
        match &mut self.editing {
            Some(edit) => Ok(&mut edit.form),
            None => self.draft.as_mut().ok_or(ValidationError::NoDraft),
        }
    }

    /// 提交草稿为新题目（追加到末尾）
    ///
    /// 编辑进行中时拒绝，避免把"追加"和"替换"混在一起
    ///
    /// # 返回
    /// 返回新题目的索引
    pub fn submit_new(&mut self) -> Result<usize, ValidationError> {
        if let Some(index) = self.edit_index() {
            return Err(ValidationError::EditInProgress { number: index + 1 });
        }
        let draft = self.draft.as_ref().ok_or(ValidationError::NoDraft)?;
        let record = draft.to_record()?;

        self.store.append(record);
        self.draft = None;

        let index = self.store.len() - 1;
        info!("✓ 已添加第 {} 题", index + 1);
        Ok(index)
    }

    /// 开始编辑某道题
    pub fn begin_edit(&mut self, index: usize) -> Result<(), ValidationError> {
        self.check_index(index)?;
        match self.edit_index() {
            Some(current) if current == index => return Ok(()),
            Some(current) => {
                return Err(ValidationError::EditInProgress {
                    number: current + 1,
                })
            }
            None => {}
        }

        let form = self
            .store
            .get(index)
            .map(QuestionDraft::from_record)
            .ok_or(ValidationError::NumberOutOfRange {
                number: index + 1,
                len: self.store.len(),
            })?;
        self.editing = Some(EditState { index, form });
        debug!("开始编辑第 {} 题", index + 1);
        Ok(())
    }

    /// 保存编辑（原地替换），成功后清除游标
    pub fn submit_edit(&mut self) -> Result<usize, ValidationError> {
        let edit = self.editing.as_ref().ok_or(ValidationError::NoActiveEdit)?;
        let record = edit.form.to_record()?;
        let index = edit.index;

        self.store.replace_at(index, record);
        self.editing = None;

        info!("✓ 已保存第 {} 题", index + 1);
        Ok(index)
    }

    /// 放弃编辑
    pub fn cancel_edit(&mut self) -> Result<usize, ValidationError> {
        let edit = self.editing.take().ok_or(ValidationError::NoActiveEdit)?;
        debug!("取消编辑第 {} 题", edit.index + 1);
        Ok(edit.index)
    }

    /// 删除题目，并维护编辑游标
    pub fn delete(&mut self, index: usize) -> Result<QuestionRecord, ValidationError> {
        self.check_index(index)?;
        let removed = self.store.delete_at(index);

        match self.edit_index() {
            Some(current) if current == index => self.editing = None,
            Some(current) if current > index => {
                if let Some(edit) = self.editing.as_mut() {
                    edit.index = current - 1;
                }
            }
            _ => {}
        }

        info!("✓ 已删除第 {} 题，剩余 {} 题", index + 1, self.store.len());
        Ok(removed)
    }

    /// 与相邻题目交换位置，编辑游标跟随被移动的题目
    ///
    /// # 返回
    /// 返回是否发生了移动（越界时为 false）
    pub fn move_question(&mut self, index: usize, direction: Direction) -> Result<bool, ValidationError> {
        self.check_index(index)?;
        let Some(target) = neighbor(index, direction, self.store.len()) else {
            return Ok(false);
        };
        self.store.swap_neighbors(index, direction);

        if let Some(edit) = &mut self.editing {
            if edit.index == index {
                edit.index = target;
            } else if edit.index == target {
                edit.index = index;
            }
        }
        Ok(true)
    }

    /// 直接替换某道题（用于翻译结果），编辑中的题目不允许被覆盖
    pub fn replace(&mut self, index: usize, record: QuestionRecord) -> Result<(), ValidationError> {
        self.check_index(index)?;
        if self.edit_index() == Some(index) {
            return Err(ValidationError::EditInProgress { number: index + 1 });
        }
        self.store.replace_at(index, record);
        Ok(())
    }
}
