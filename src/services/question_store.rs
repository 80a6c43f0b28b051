//! 题目列表 - 业务能力层
//!
//! 有序、可变的题目序列。顺序即展示和导出顺序。
//! 编辑游标不在这里维护，由会话层（workflow）负责

use crate::models::QuestionRecord;

/// 相邻交换的方向
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// 题目列表
#[derive(Debug, Clone, Default)]
pub struct QuestionStore {
    records: Vec<QuestionRecord>,
}

impl QuestionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&QuestionRecord> {
        self.records.get(index)
    }

    pub fn records(&self) -> &[QuestionRecord] {
        &self.records
    }

    /// 追加到末尾
    pub fn append(&mut self, record: QuestionRecord) {
        self.records.push(record);
    }

    /// 原地替换
    ///
    /// # Panics
    /// `index` 超出范围时 panic，调用方必须先校验
    pub fn replace_at(&mut self, index: usize, record: QuestionRecord) {
        assert!(
            index < self.records.len(),
            "replace_at 索引越界: {} (长度 {})",
            index,
            self.records.len()
        );
        self.records[index] = record;
    }

    /// 删除并返回该题，后续题目前移
    ///
    /// # Panics
    /// `index` 超出范围时 panic
    pub fn delete_at(&mut self, index: usize) -> QuestionRecord {
        assert!(
            index < self.records.len(),
            "delete_at 索引越界: {} (长度 {})",
            index,
            self.records.len()
        );
        self.records.remove(index)
    }

    /// 与相邻题目交换，越界时什么也不做
    ///
    /// # 返回
    /// 返回是否发生了交换
    pub fn swap_neighbors(&mut self, index: usize, direction: Direction) -> bool {
        let Some(target) = neighbor(index, direction, self.records.len()) else {
            return false;
        };
        self.records.swap(index, target);
        true
    }
}

/// 计算相邻位置，越界返回 None
pub fn neighbor(index: usize, direction: Direction, len: usize) -> Option<usize> {
    if index >= len {
        return None;
    }
    match direction {
        Direction::Up => index.checked_sub(1),
        Direction::Down => Some(index + 1).filter(|&i| i < len),
    }
}
