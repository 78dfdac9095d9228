//! Sink 投递指标收集模块
//!
//! 基于 `MetricsSnapshot` 与每次投递结果收集 sink 拓扑的运行指标。

use std::collections::BTreeMap;

use contracts::Level;
use dispatcher::MetricsSnapshot;
use metrics::{counter, gauge, histogram};

/// 从 MetricsSnapshot 记录单个 sink 的指标
///
/// # Example
///
/// ```ignore
/// use observability::metrics::record_sink_snapshot;
///
/// let metered = Metered::new();
/// let sink = metered.wrap(leaf);
/// // ...
/// record_sink_snapshot("console", &metered.metrics().snapshot());
/// ```
pub fn record_sink_snapshot(sink_name: &str, snapshot: &MetricsSnapshot) {
    counter!("sinkmux_sink_handled_total", "sink" => sink_name.to_string())
        .absolute(snapshot.handled_count);
    counter!("sinkmux_sink_failed_total", "sink" => sink_name.to_string())
        .absolute(snapshot.failure_count);
    counter!("sinkmux_sink_filtered_total", "sink" => sink_name.to_string())
        .absolute(snapshot.filtered_count);

    let attempts = snapshot.handled_count + snapshot.failure_count;
    if attempts > 0 {
        gauge!("sinkmux_sink_failure_ratio", "sink" => sink_name.to_string())
            .set(snapshot.failure_count as f64 / attempts as f64);
    }
}

/// 记录一次根 sink 投递
pub fn record_records_emitted(level: Level, success: bool) {
    let status = if success { "success" } else { "failure" };
    counter!(
        "sinkmux_records_emitted_total",
        "level" => level.as_str(),
        "status" => status
    )
    .increment(1);
}

/// 记录单次投递耗时
pub fn record_handle_latency_ms(latency_ms: f64) {
    histogram!("sinkmux_handle_latency_ms").record(latency_ms);
}

/// 投递指标聚合器
///
/// 在内存中聚合指标，便于统计和输出摘要。
#[derive(Debug, Clone, Default)]
pub struct DeliveryAggregator {
    /// 投递总数
    pub total_records: u64,

    /// 失败次数
    pub total_failed: u64,

    /// 投递耗时统计 (毫秒)
    pub latency_stats: RunningStats,

    /// 各 sink 最新快照
    pub sink_snapshots: BTreeMap<String, MetricsSnapshot>,
}

impl DeliveryAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, success: bool, latency_ms: f64) {
        self.total_records += 1;
        if !success {
            self.total_failed += 1;
        }
        self.latency_stats.push(latency_ms);
    }

    /// 记录 sink 快照 (覆盖旧值)
    pub fn set_snapshot(&mut self, sink_name: impl Into<String>, snapshot: MetricsSnapshot) {
        self.sink_snapshots.insert(sink_name.into(), snapshot);
    }

    /// 生成摘要报告
    pub fn summary(&self) -> DeliverySummary {
        DeliverySummary {
            total_records: self.total_records,
            total_failed: self.total_failed,
            failure_rate: if self.total_records > 0 {
                self.total_failed as f64 / self.total_records as f64 * 100.0
            } else {
                0.0
            },
            latency_ms: StatsSummary::from(&self.latency_stats),
            sink_snapshots: self.sink_snapshots.clone(),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct DeliverySummary {
    pub total_records: u64,
    pub total_failed: u64,
    pub failure_rate: f64,
    pub latency_ms: StatsSummary,
    pub sink_snapshots: BTreeMap<String, MetricsSnapshot>,
}

impl std::fmt::Display for DeliverySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Delivery Summary ===")?;
        writeln!(f, "Records emitted: {}", self.total_records)?;
        writeln!(
            f,
            "Failed deliveries: {} ({:.2}%)",
            self.total_failed, self.failure_rate
        )?;
        writeln!(f, "Handle latency (ms): {}", self.latency_ms)?;

        if !self.sink_snapshots.is_empty() {
            writeln!(f, "Per-sink counters:")?;
            for (sink, snap) in &self.sink_snapshots {
                writeln!(
                    f,
                    "  {}: handled={} failed={} filtered={}",
                    sink, snap.handled_count, snap.failure_count, snap.filtered_count
                )?;
            }
        }

        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    /// 样本数量
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值
    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 最小值
    pub fn min(&self) -> f64 {
        self.min
    }

    /// 最大值
    pub fn max(&self) -> f64 {
        self.max
    }
}
