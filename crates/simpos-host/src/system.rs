//! 主机/系统信息采集。
//!
//! 作者：SimpOs 项目组
//! 创建时间：2026-10-14
//! 修改时间：2026-10-14

use simpos_core::host::InfoField;
use simpos_core::security::utc_timestamp;
use sysinfo::System;

/// 采集主机信息；取不到的字段直接省略。
pub fn collect() -> Vec<InfoField> {
    let mut fields = Vec::new();
    let mut push = |label: &'static str, value: Option<String>| {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            fields.push(InfoField { label, value });
        }
    };

    push("Hostname", System::host_name());
    push(
        "Platform",
        System::name().map(|name| match System::os_version() {
            Some(version) => format!("{name} {version}"),
            None => name,
        }),
    );
    push("Kernel", System::kernel_version());
    push("Architecture", Some(std::env::consts::ARCH.to_string()));
    push(
        "Runtime",
        Some(format!("simpos {}", env!("CARGO_PKG_VERSION"))),
    );
    // Windows 上 sysinfo 返回全 0，视为不可用。
    let load = System::load_average();
    let has_load = load.one > 0.0 || load.five > 0.0 || load.fifteen > 0.0;
    push(
        "Load average",
        has_load.then(|| format!("{:.2} {:.2} {:.2}", load.one, load.five, load.fifteen)),
    );
    push("Time (UTC)", Some(utc_timestamp()));
    fields
}
