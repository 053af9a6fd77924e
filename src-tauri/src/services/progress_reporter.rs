//! 装饰性进度反馈
//!
//! 服务端没有真实进度可查,这里按任务执行器的忙/闲状态
//! 模拟前进: 随机步进、封顶90%,任务结束时跳到100%并在
//! 短暂停留后归零隐藏。任何情况下都不阻塞、不参与正确性。

use rand::Rng;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

/// 运行期间的封顶百分比
const CAP_PERCENT: f32 = 90.0;
/// 单次步进上限
const MAX_STEP: f32 = 15.0;
/// 完成后归零前的停留时长
const RESET_DELAY: Duration = Duration::from_millis(500);

/// 进度快照 (watch通道对外发布)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProgressState {
    /// 是否展示进度条
    pub active: bool,

    /// 当前百分比 (0.0 - 100.0)
    pub percent: f32,
}

impl ProgressState {
    fn hidden() -> Self {
        Self {
            active: false,
            percent: 0.0,
        }
    }
}

/// 进度报告器
///
/// begin/finish由任务执行器在保证清理的路径上成对调用。
/// 代数计数器防止迟到的归零任务覆盖新一轮的进度。
pub struct ProgressReporter {
    tx: Arc<watch::Sender<ProgressState>>,
    running: Arc<AtomicBool>,
    generation: Arc<AtomicU64>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(ProgressState::hidden());
        Self {
            tx: Arc::new(tx),
            running: Arc::new(AtomicBool::new(false)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// 订阅进度更新
    pub fn subscribe(&self) -> watch::Receiver<ProgressState> {
        self.tx.subscribe()
    }

    /// 当前快照
    pub fn current(&self) -> ProgressState {
        *self.tx.borrow()
    }

    /// 任务开始: 从0起步,后台任务随机推进
    pub fn begin(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);
        self.tx.send_replace(ProgressState {
            active: true,
            percent: 0.0,
        });

        let tx = Arc::clone(&self.tx);
        let running = Arc::clone(&self.running);
        tokio::spawn(async move {
            loop {
                let (delay_ms, step) = {
                    let mut rng = rand::thread_rng();
                    (rng.gen_range(300..800), rng.gen_range(0.0..MAX_STEP))
                };
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;

                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let current = tx.borrow().percent;
                tx.send_replace(ProgressState {
                    active: true,
                    percent: advance(current, step),
                });
            }
        });
    }

    /// 任务结束: 跳到100%,停留后归零隐藏
    pub fn finish(&self) {
        self.running.store(false, Ordering::SeqCst);
        self.tx.send_replace(ProgressState {
            active: true,
            percent: 100.0,
        });

        let finished_generation = self.generation.load(Ordering::SeqCst);
        let tx = Arc::clone(&self.tx);
        let generation = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(RESET_DELAY).await;
            // 停留期间若有新任务开始,归零让位于新进度
            if generation.load(Ordering::SeqCst) != finished_generation {
                return;
            }
            tx.send_replace(ProgressState::hidden());
        });
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

/// 推进一步,封顶90%
fn advance(current: f32, step: f32) -> f32 {
    (current + step).min(CAP_PERCENT)
}
