//! Localized strings for the dashboard.
//!
//! Lookup falls back from the active locale to English, then to the key
//! itself, so a missing translation shows the English source text rather than
//! an empty label. Placeholders (`{name}`) are replaced literally.

use std::collections::HashMap;
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Zh,
}

impl Locale {
    pub const BASE: Locale = Locale::En;

    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Zh => "zh",
        }
    }

    /// Map a BCP 47 tag (`zh-CN`, `en_US`, `zh-Hant`) onto a supported locale.
    pub fn from_language_tag(tag: &str) -> Locale {
        let primary = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match primary.as_str() {
            "zh" => Locale::Zh,
            _ => Locale::En,
        }
    }
}

// Keys are the English source strings except where a short symbolic key
// reads better at the call site; those carry an English entry too.
const EN: &[(&str, &str)] = &[
    ("status.follow", "Follow"),
    ("status.due_diligence", "Due Diligence"),
    ("status.invested", "Invested"),
    ("status.pass", "Pass"),
    ("status.reject", "Reject"),
    ("status.unknown", "Unknown"),
    ("tab.market", "Market"),
    ("tab.deals", "Deals"),
    ("tab.contacts", "Contacts"),
    ("tab.research", "Research"),
    ("toast.error", "Error"),
    ("footer.data_delay", "Market data may be delayed up to 15 minutes."),
];

const ZH: &[(&str, &str)] = &[
    ("status.follow", "关注"),
    ("status.due_diligence", "尽职调查"),
    ("status.invested", "已投资"),
    ("status.pass", "放弃"),
    ("status.reject", "拒绝"),
    ("status.unknown", "未知"),
    ("tab.market", "市场"),
    ("tab.deals", "项目"),
    ("tab.contacts", "联系人"),
    ("tab.research", "研究"),
    ("toast.error", "错误"),
    ("AI/Tech Daily", "AI科技日报"),
    ("Welcome Back, {name}", "欢迎回来，{name}"),
    ("Investor", "投资人"),
    ("Dashboard", "仪表盘"),
    ("Top Movers", "涨跌榜"),
    ("Deal Pipeline", "项目管道"),
    ("Total Deals", "项目总数"),
    ("Following", "关注中"),
    ("Active", "进行中"),
    ("Closed", "已结束"),
    ("Search deals...", "搜索项目..."),
    ("Search contacts...", "搜索联系人..."),
    ("All Sectors", "所有行业"),
    ("All Statuses", "所有状态"),
    ("All Rounds", "所有轮次"),
    ("Deal deleted", "项目已删除"),
    ("Contact deleted", "联系人已删除"),
    ("{project} has been removed.", "{project} 已被删除。"),
    ("{name} has been removed.", "{name} 已被删除。"),
    ("Failed to load deals", "加载项目失败"),
    ("Failed to load contacts", "加载联系人失败"),
    ("Failed to load dashboard", "加载仪表盘失败"),
    ("Failed to load profile", "加载个人资料失败"),
    ("Failed to delete deal", "删除项目失败"),
    ("Failed to delete contact", "删除联系人失败"),
    ("Thanks for your feedback!", "感谢您的反馈！"),
    ("Feedback cannot be empty", "反馈内容不能为空"),
    ("Failed to send feedback", "发送反馈失败"),
    ("Page not found", "页面未找到"),
    ("Onboarding", "新手引导"),
    ("Settings", "设置"),
    ("Sign In", "登录"),
    ("Return to Home", "返回首页"),
    ("Why did {symbol} move {change}%?", "{symbol} 为何变动 {change}%？"),
    ("Loading...", "加载中..."),
];

fn table(locale: Locale) -> &'static HashMap<&'static str, &'static str> {
    static EN_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    static ZH_TABLE: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();
    match locale {
        Locale::En => EN_TABLE.get_or_init(|| EN.iter().copied().collect()),
        Locale::Zh => ZH_TABLE.get_or_init(|| ZH.iter().copied().collect()),
    }
}

/// Resolve `key` for `locale`: active locale, then English, then the key.
pub fn lookup<'a>(locale: Locale, key: &'a str) -> &'a str {
    if let Some(s) = table(locale).get(key) {
        return *s;
    }
    if locale != Locale::BASE {
        if let Some(s) = table(Locale::BASE).get(key) {
            return *s;
        }
    }
    key
}

/// Replace each `{name}` placeholder with its value. Unmatched placeholders
/// are left as-is; values are inserted verbatim.
pub fn interpolate(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (name, value) in vars {
        out = out.replace(&format!("{{{}}}", name), value);
    }
    out
}

pub fn translate(locale: Locale, key: &str, vars: &[(&str, &str)]) -> String {
    interpolate(lookup(locale, key), vars)
}

/// Locale state owned by the app context.
#[derive(Default)]
pub struct I18n {
    locale: RwLock<Locale>,
}

impl I18n {
    pub fn new(locale: Locale) -> Self {
        Self {
            locale: RwLock::new(locale),
        }
    }

    pub fn locale(&self) -> Locale {
        *self.locale.read()
    }

    /// Switch locale. Takes effect for the very next lookup.
    pub fn set_locale(&self, locale: Locale) {
        *self.locale.write() = locale;
    }

    pub fn t(&self, key: &str) -> String {
        lookup(self.locale(), key).to_string()
    }

    pub fn t_with(&self, key: &str, vars: &[(&str, &str)]) -> String {
        translate(self.locale(), key, vars)
    }
}
