//! Playback Context - Aggregate Root

use serde::Serialize;
use std::collections::VecDeque;

use super::{PlaybackError, Track, TransportState, Volume};

/// 播放队列聚合根
///
/// 单个播放上下文（一个服务器/频道）的 FIFO 队列与传输状态。
/// 本身不做同步，由持有者串行化所有访问。
///
/// 不变量:
/// - volume 始终在 [0.0, 1.0]
/// - playing == true 蕴含 current 存在
/// - 曲目出队成为 current 时即从队列中移除
#[derive(Debug, Clone, Default)]
pub struct PlaybackQueue {
    queue: VecDeque<Track>,
    current: Option<Track>,
    playing: bool,
    volume: Volume,
    /// 已连接的播放通道（语音频道 ID），None 表示未连接
    sink: Option<String>,
}

/// 某一时刻的完整状态副本，与后续修改互不影响
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSnapshot {
    pub queue: Vec<Track>,
    pub current: Option<Track>,
    pub playing: bool,
    pub volume: Volume,
    pub connected: bool,
    pub channel_id: Option<String>,
}

/// 入队并在空闲时立即开始的结果
#[derive(Debug, Clone, PartialEq)]
pub enum EnqueueOutcome {
    /// 新曲目直接成为 current 并开始播放
    Started(Track),
    /// 新曲目留在队列中，position 从 1 开始
    Queued { position: usize },
}

impl PlaybackSnapshot {
    pub fn transport_state(&self) -> TransportState {
        transport_state_of(self.current.is_some(), self.playing)
    }
}

fn transport_state_of(has_current: bool, playing: bool) -> TransportState {
    match (has_current, playing) {
        (false, _) => TransportState::Idle,
        (true, false) => TransportState::Paused,
        (true, true) => TransportState::Playing,
    }
}

impl PlaybackQueue {
    pub fn new(volume: Volume) -> Self {
        Self {
            volume,
            ..Self::default()
        }
    }

    /// 追加到队尾
    pub fn enqueue(&mut self, track: Track) {
        self.queue.push_back(track);
    }

    /// 入队；只有空闲（没有 current）时才开始播放
    ///
    /// 暂停中的曲目不会被替换
    pub fn enqueue_and_start_if_idle(&mut self, track: Track) -> EnqueueOutcome {
        if self.current.is_none() && self.queue.is_empty() {
            self.playing = true;
            return EnqueueOutcome::Started(self.current.insert(track).clone());
        }

        self.queue.push_back(track);
        if self.current.is_none() {
            // 空闲但队列里已有曲目：从队首开始，新曲目排在队尾
            self.current = self.queue.pop_front();
            self.playing = self.current.is_some();
        }
        EnqueueOutcome::Queued {
            position: self.queue.len(),
        }
    }

    /// 开始或继续播放
    ///
    /// - 已在播放: 不做任何事
    /// - 队列非空: 队首出队成为 current，开始播放
    /// - 队列为空但有暂停中的 current: 继续播放它
    /// - 否则返回 `QueueEmpty`，状态不变
    pub fn start_or_resume(&mut self) -> Result<&Track, PlaybackError> {
        if !(self.playing && self.current.is_some()) {
            if let Some(next) = self.queue.pop_front() {
                self.current = Some(next);
            } else if self.current.is_none() {
                return Err(PlaybackError::QueueEmpty);
            }
            self.playing = true;
        }
        self.current.as_ref().ok_or(PlaybackError::QueueEmpty)
    }

    /// 暂停（幂等）
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// 只继续当前曲目，不出队。返回是否处于播放状态
    pub fn resume(&mut self) -> bool {
        if self.current.is_some() {
            self.playing = true;
        }
        self.playing
    }

    /// 跳到下一首
    ///
    /// 队列非空时队首替换 current，playing 保持不变；
    /// 队列为空时清空 current 并停止，返回 `QueueEmpty`
    pub fn skip(&mut self) -> Result<&Track, PlaybackError> {
        match self.queue.pop_front() {
            Some(next) => Ok(&*self.current.insert(next)),
            None => {
                self.current = None;
                self.playing = false;
                Err(PlaybackError::QueueEmpty)
            }
        }
    }

    /// 停止并清空队列
    pub fn stop(&mut self) {
        self.current = None;
        self.playing = false;
        self.queue.clear();
    }

    /// 设置音量，越界值被钳制。返回实际保存的音量
    pub fn set_volume(&mut self, volume: f64) -> Volume {
        self.volume = Volume::new(volume);
        self.volume
    }

    /// 移除指定位置的曲目，后续曲目前移
    pub fn remove_at(&mut self, index: usize) -> Result<Track, PlaybackError> {
        let len = self.queue.len();
        self.queue
            .remove(index)
            .ok_or(PlaybackError::IndexOutOfRange { index, len })
    }

    /// 把 `from` 处的曲目移动到 `to`，其余曲目保持相对顺序
    pub fn move_in_queue(&mut self, from: usize, to: usize) -> Result<(), PlaybackError> {
        let len = self.queue.len();
        for index in [from, to] {
            if index >= len {
                return Err(PlaybackError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }
        if let Some(track) = self.queue.remove(from) {
            self.queue.insert(to, track);
        }
        Ok(())
    }

    /// 只清空队列，current 与播放状态不变
    pub fn clear_queue(&mut self) {
        self.queue.clear();
    }

    pub fn connect(&mut self, channel_id: impl Into<String>) {
        self.sink = Some(channel_id.into());
    }

    pub fn disconnect(&mut self) {
        self.sink = None;
    }

    // Getters
    pub fn queue(&self) -> impl ExactSizeIterator<Item = &Track> {
        self.queue.iter()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn current(&self) -> Option<&Track> {
        self.current.as_ref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> Volume {
        self.volume
    }

    pub fn is_connected(&self) -> bool {
        self.sink.is_some()
    }

    pub fn channel_id(&self) -> Option<&str> {
        self.sink.as_deref()
    }

    pub fn transport_state(&self) -> TransportState {
        transport_state_of(self.current.is_some(), self.playing)
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            queue: self.queue.iter().cloned().collect(),
            current: self.current.clone(),
            playing: self.playing,
            volume: self.volume,
            connected: self.is_connected(),
            channel_id: self.sink.clone(),
        }
    }
}
