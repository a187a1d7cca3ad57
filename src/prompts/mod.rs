//! Prompt synthesis: profile attributes + topic + context → one finished
//! natural-language instruction prompt.
//!
//! Every function here is pure and total. Attributes arrive as a merged JSON
//! object (profile fields with caller overrides applied on top), so missing
//! fields always fall back to documented defaults instead of failing.

use serde_json::Value;

static NULL: Value = Value::Null;

fn section<'a>(attrs: &'a Value, key: &str) -> &'a Value {
    attrs.get(key).unwrap_or(&NULL)
}

fn str_or<'a>(v: &'a Value, key: &str, default: &'a str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn f64_or(v: &Value, key: &str, default: f64) -> f64 {
    v.get(key).and_then(Value::as_f64).unwrap_or(default)
}

fn u64_or(v: &Value, key: &str, default: u64) -> u64 {
    v.get(key).and_then(Value::as_u64).unwrap_or(default)
}

/// Render a field that may be a string or a number in the source JSON.
fn display_or(v: &Value, key: &str, default: &str) -> String {
    match v.get(key) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => default.to_string(),
    }
}

fn first_key(v: &Value) -> Option<&str> {
    v.as_object().and_then(|m| m.keys().next()).map(String::as_str)
}

// ---------------------------------------------------------------------------
// Media prompt
// ---------------------------------------------------------------------------

/// Build the press-question instruction prompt for a media agent.
pub fn media_prompt(topic: &str, attributes: &Value, context: &str) -> String {
    let basic_info = section(attributes, "basic_info");
    let analysis = section(attributes, "taiwan_issue_analysis");
    let performance = section(attributes, "overall_performance");
    let params = section(attributes, "generation_parameters");

    let media_name = str_or(basic_info, "name", "该媒体");
    let media_country = str_or(basic_info, "country", "未知");
    let media_type = str_or(basic_info, "media_type", "媒体");
    let ownership = str_or(basic_info, "ownership", "未知");
    let political_stance = str_or(basic_info, "political_stance", "未知");
    let language = str_or(basic_info, "language", "中文");

    let total_questions = u64_or(analysis, "total_questions", 0);
    let counter_ratio = f64_or(analysis, "counter_ratio", 0.0) * 100.0;
    let aligned_ratio = f64_or(analysis, "aligned_ratio", 0.0) * 100.0;
    let neutral_ratio = f64_or(analysis, "neutral_ratio", 0.0) * 100.0;
    let stance_label = str_or(analysis, "stance_label", "未知");
    let avg_question_length = f64_or(analysis, "avg_question_length", 100.0);
    let avg_aligned_score = f64_or(analysis, "avg_aligned_score", 0.5);
    let avg_counter_score = f64_or(analysis, "avg_counter_score", 0.5);
    let issue_entropy = f64_or(analysis, "issue_entropy", 0.0);
    let taiwan_issue_ratio = f64_or(analysis, "taiwan_issue_ratio", 0.0) * 100.0;

    let media_total_questions = u64_or(performance, "media_total_questions", 0);
    let media_taihai_questions = u64_or(performance, "media_taihai_questions", 0);
    let taiwan_question_ratio = f64_or(performance, "taiwan_question_ratio", 0.0) * 100.0;
    let coverage_intensity = f64_or(performance, "coverage_intensity", 0.0) * 100.0;

    let question_style = str_or(params, "question_style", "客观中立");
    let focus_priority = section(params, "focus_priority");
    let challenge_level = f64_or(params, "challenge_level", 0.0) * 100.0;
    let neutral_tendency = f64_or(params, "neutral_tendency", 0.0) * 100.0;
    let semantic_intensity = f64_or(params, "semantic_intensity", 0.5);
    let topic_preferences = section(params, "topic_preferences");

    let issue_focus_desc =
        build_issue_focus_description(section(analysis, "issue_distribution"), focus_priority);
    let style_desc = build_style_description(question_style, stance_label, challenge_level);

    let context_desc = if context.is_empty() { "常规新闻发布会" } else { context };
    let primary_focus = first_key(focus_priority).unwrap_or("议题核心");
    let preferred_topic = first_key(topic_preferences).unwrap_or("核心议题");

    let prompt = format!(
        r#"# 新闻记者提问生成指令

## 一、媒体身份与背景
你是**{media_name}**的记者，这是一家**{media_country}**的**{media_type}**（{ownership}）。

## 二、媒体特征分析（基于历史数据）

### 2.1 基本立场特征
- **总体立场标签**: {stance_label}
- **一致立场提问比例**: {aligned_ratio:.1}%
- **对立立场提问比例**: {counter_ratio:.1}%
- **中性立场提问比例**: {neutral_ratio:.1}%
- **政治立场**: {political_stance}

### 2.2 提问行为特征
- **平均提问长度**: {avg_question_length:.0}字符
- **提问总量（涉台）**: {total_questions}个问题
- **语义一致性强度**: {avg_aligned_score:.3}
- **语义对立强度**: {avg_counter_score:.3}
- **议题多样性指数**: {issue_entropy:.3}

### 2.3 议题关注偏好
{taiwan_issue_ratio:.1}%的问题聚焦台湾核心议题
{issue_focus_desc}

### 2.4 整体报道表现
- **总提问量**: {media_total_questions}个问题
- **涉台提问量**: {media_taihai_questions}个问题
- **台海议题占比**: {taiwan_question_ratio:.2}%
- **报道强度**: {coverage_intensity:.2}%

## 三、当前任务情境
**发布会议题**: {topic}
**背景信息**: {context_desc}

## 四、提问生成要求

### 4.1 立场与态度要求
1. **立场体现**: 提问必须体现 **{stance_label}** 的立场特征
   - 如为Aligned立场，应体现理解、支持或共识导向
   - 如为Counter立场，可体现质疑、挑战或对立视角
   - 如为Mixed立场，应保持平衡客观

2. **态度强度**:
   - 一致性态度强度: {semantic_intensity:.3}（{intensity_desc}）
   - 挑战性程度: {challenge_level:.1}%
   - 中立倾向: {neutral_tendency:.1}%

### 4.2 内容与形式要求
1. **提问风格**: {style_desc}
2. **问题长度**: 控制在{min_length:.0}-{max_length:.0}字符之间
3. **问题焦点**: 应优先关注{primary_focus}方面
4. **语言要求**: 使用{language}提问

### 4.3 议题相关要求
1. **议题相关性**: 问题必须直接针对"{topic}"议题
2. **专业性**: 体现{media_type}的专业性和深度
3. **新闻价值**: 问题要有新闻价值，能引发思考或讨论
4. **具体性**: 避免泛泛而谈，要有具体指向

## 五、生成示例参考
基于历史数据分析，{media_name}记者通常会：
- 提出{avg_question_length:.0}字符左右的问题
- 采用{question_style}的提问方式
- 关注{preferred_topic}

## 六、最终输出
请直接给出符合以上所有要求的提问内容，不要添加任何解释、前缀或后缀。"#,
        intensity_desc = describe_intensity(semantic_intensity),
        min_length = avg_question_length * 0.7,
        max_length = avg_question_length * 1.3,
    );

    prompt.trim().to_string()
}

// ---------------------------------------------------------------------------
// User prompt
// ---------------------------------------------------------------------------

/// Build the social-media comment instruction prompt for a user agent.
pub fn user_prompt(topic: &str, attributes: &Value, context: &str) -> String {
    let nationality = str_or(attributes, "nationality", "未知");
    let age = display_or(attributes, "age", "未知");
    let education = str_or(attributes, "education", "未知");
    let political_leaning = str_or(attributes, "political_leaning", "中立");
    let platform = str_or(attributes, "platform", "社交媒体");
    let posting_style = str_or(attributes, "posting_style", "一般评论");
    let profession = str_or(attributes, "profession", "未知");
    let influence = u64_or(attributes, "influence_followers", 0);

    let attitude_desc = match attributes.get("attitude_to_china") {
        Some(Value::Number(n)) => attitude_band(n.as_f64().unwrap_or(0.0)).to_string(),
        Some(Value::String(s)) => s.clone(),
        _ => "中立".to_string(),
    };

    let interests_line = match attributes.get("interests") {
        Some(Value::Array(list)) if !list.is_empty() => {
            let joined = list
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("\n- **兴趣领域**: {}", joined)
        }
        Some(Value::String(s)) if !s.is_empty() => format!("\n- **兴趣领域**: {}", s),
        _ => String::new(),
    };
    let influence_line = if influence > 0 {
        format!("\n- **影响力**: 约有{}名关注者", influence)
    } else {
        String::new()
    };

    let context_desc = if context.is_empty() {
        format!("关于{}的新闻报道", topic)
    } else {
        context.to_string()
    };
    let style_of_platform = platform_style(platform);

    let prompt = format!(
        r#"# 社交媒体用户评论生成指令

## 一、用户身份信息
你是一位**{nationality}**的社交媒体用户。

## 二、用户特征
- **年龄**: {age}
- **教育背景**: {education}
- **职业**: {profession}
- **政治倾向**: {political_leaning}
- **对华态度**: {attitude_desc}
- **活跃平台**: {platform}
- **发帖风格**: {posting_style}{interests_line}{influence_line}

## 三、当前情境
**讨论议题**: {topic}
**看到的新闻/信息**: {context_desc}

## 四、评论生成要求

### 4.1 身份一致性要求
1. **国籍体现**: 评论应体现{nationality}用户的视角和关切
2. **政治倾向**: 符合{political_leaning}的政治立场
3. **对华态度**: 体现{attitude_desc}的态度倾向

### 4.2 平台适应性要求
1. **平台特点**: {style_of_platform}
2. **表达风格**: {posting_style}
3. **内容形式**: 适合在{platform}上传播

### 4.3 内容质量要求
1. **相关性**: 直接针对"{topic}"议题
2. **观点性**: 有明确观点，不只是事实陈述
3. **个人色彩**: 体现个人背景和立场
4. **适当情绪**: 根据态度包含适当的情感色彩
5. **简洁性**: 评论长度在30-150字之间

### 4.4 语言要求
1. **语言**: 使用中文
2. **表达**: 可适当使用网络用语、表情符号或标签
3. **可读性**: 易于理解，有传播力

## 五、生成示例
典型的{platform}用户评论：
- 观点明确，立场清晰
- 语言符合平台特点
- 有个人特色
- 引发讨论或共鸣

## 六、最终输出
请直接给出符合以上要求的评论内容，不要添加任何解释。"#
    );

    prompt.trim().to_string()
}

// ---------------------------------------------------------------------------
// Helper subroutines
// ---------------------------------------------------------------------------

/// Describe which issue categories the outlet focuses on: every category
/// whose weight exceeds 0.1, re-labeled with its human-readable topic name,
/// then the top-3 focus-priority names joined with "、".
fn build_issue_focus_description(issue_distribution: &Value, focus_priority: &Value) -> String {
    let mut descriptions: Vec<String> = Vec::new();

    if let Some(dist) = issue_distribution.as_object() {
        for (key, value) in dist {
            let ratio = value.as_f64().unwrap_or(0.0);
            if ratio > 0.1 {
                let desc = if key.contains("EI_1") {
                    "外国政府涉台立法"
                } else if key.contains("EI_2") {
                    "外国政要涉台表态或访问"
                } else if key.contains("EI_3") {
                    "国际组织涉台表述"
                } else if key.contains("EI_5") {
                    "外媒涉台报道争议"
                } else if key.contains("MS_1") {
                    "外国军舰军机穿越台海"
                } else if key.contains("MS_2") {
                    "对台军售或军事援助"
                } else {
                    key.as_str()
                };
                descriptions.push(format!("- {}: {:.1}%", desc, ratio * 100.0));
            }
        }
    }

    if let Some(priority) = focus_priority.as_object() {
        if !priority.is_empty() {
            let names: Vec<&str> = priority.keys().take(3).map(String::as_str).collect();
            descriptions.push(format!("\n**关注优先级**: {}", names.join("、")));
        }
    }

    if descriptions.is_empty() {
        return "无明显特定议题偏好".to_string();
    }
    descriptions.join("\n")
}

/// Combine the qualitative style label with challenge-level and stance
/// qualifiers into one style sentence.
fn build_style_description(question_style: &str, stance_label: &str, challenge_level: f64) -> String {
    let base_style = match question_style {
        "客观中立型（带有共识导向）" => "客观、中立，寻求共识",
        "正式权威型" => "正式、权威，体现专业性",
        "直接追问型" => "直接、有力，善于追问",
        "分析探究型" => "分析深入，善于探究本质",
        "平衡报道型" => "平衡各方观点，全面客观",
        other => other,
    };

    let challenge_desc = if challenge_level > 70.0 {
        "（高挑战性，常提出尖锐问题）"
    } else if challenge_level > 30.0 {
        "（中等挑战性，适时追问）"
    } else {
        "（低挑战性，以建设性提问为主）"
    };

    let stance_desc = match stance_label {
        "Aligned" => "倾向于支持性、理解性提问",
        "Counter" => "倾向于质疑性、批判性提问",
        _ => "倾向于平衡性、中立性提问",
    };

    format!("{}{}，{}", base_style, challenge_desc, stance_desc)
}

/// Qualitative label for a semantic-intensity score.
fn describe_intensity(intensity: f64) -> &'static str {
    if intensity > 0.7 {
        "较强"
    } else if intensity > 0.5 {
        "中等"
    } else {
        "较弱"
    }
}

/// Expression characteristics per social platform.
fn platform_style(platform: &str) -> &'static str {
    match platform {
        "Twitter" => "短小精悍，常使用标签(#)，观点鲜明",
        "微博" => "中文表达，可包含表情符号，话题性强",
        "Facebook" => "相对详细，可包含链接和图片描述",
        "YouTube" => "评论常与视频内容相关，可较长",
        "Reddit" => "社区化讨论，有特定板块规则",
        "知乎" => "较为理性，分析性强，可较长",
        "TikTok" => "简短直接，常使用流行语和表情",
        "微信" => "朋友圈风格，个人化表达",
        "论坛/BBS" => "讨论深入，可能有长篇回复",
        _ => "适应平台特点的表达方式",
    }
}

/// Qualitative band for a numeric attitude score in [-1, 1].
pub fn attitude_band(score: f64) -> &'static str {
    if score > 0.6 {
        "非常友好/积极支持"
    } else if score > 0.3 {
        "友好/支持"
    } else if score > -0.3 {
        "中立/客观"
    } else if score > -0.6 {
        "质疑/批评"
    } else {
        "强烈反对/批评"
    }
}

/// Recommended sampling temperature from stance percentages.
///
/// Additive adjustments to a 0.7 base: a high neutral share raises it, high
/// consistency lowers it, high challenge raises it. Clamped to [0.3, 0.9].
/// Advisory only; callers may override.
pub fn recommended_temperature(
    neutral_ratio: f64,
    consistency_level: f64,
    challenge_level: f64,
) -> f64 {
    let base_temp: f64 = 0.7;
    let mut adjust: f64 = 0.0;

    if neutral_ratio > 50.0 {
        adjust += 0.1;
    } else if neutral_ratio > 30.0 {
        adjust += 0.05;
    }

    if consistency_level > 80.0 {
        adjust -= 0.1;
    } else if consistency_level > 60.0 {
        adjust -= 0.05;
    }

    if challenge_level > 70.0 {
        adjust += 0.1;
    } else if challenge_level > 40.0 {
        adjust += 0.05;
    }

    (base_temp + adjust).clamp(0.3, 0.9)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::enrich::enrich_row;
    use crate::profiles::row::test_support::sample_row;

    fn media_attrs() -> Value {
        let mut row = sample_row("《中国日报》");
        row.stance_label = Some("Aligned".into());
        serde_json::to_value(enrich_row(&row)).unwrap()
    }

    #[test]
    fn test_media_prompt_sections() {
        let attrs = media_attrs();
        let prompt = media_prompt("朝韩关系紧张与地区安全", &attrs, "近期半岛局势升级");

        assert!(prompt.starts_with("# 新闻记者提问生成指令"));
        assert!(prompt.contains("你是**《中国日报》**的记者"));
        assert!(prompt.contains("**总体立场标签**: Aligned"));
        // Ratios rendered as percentages with one decimal place.
        assert!(prompt.contains("**一致立场提问比例**: 66.7%"));
        assert!(prompt.contains("**发布会议题**: 朝韩关系紧张与地区安全"));
        assert!(prompt.contains("**背景信息**: 近期半岛局势升级"));
        // Length window is rendered as concrete values: avg 83.7 → [59, 109].
        assert!(prompt.contains("控制在59-109字符之间"));
        assert!(prompt.contains("使用中文提问"));
        assert!(prompt.ends_with("请直接给出符合以上所有要求的提问内容，不要添加任何解释、前缀或后缀。"));
    }

    #[test]
    fn test_media_prompt_empty_context_default() {
        let attrs = media_attrs();
        let prompt = media_prompt("台海局势", &attrs, "");
        assert!(prompt.contains("**背景信息**: 常规新闻发布会"));
    }

    #[test]
    fn test_media_prompt_never_fails_on_empty_attrs() {
        let prompt = media_prompt("议题", &Value::Null, "");
        assert!(prompt.contains("你是**该媒体**的记者"));
        assert!(prompt.contains("无明显特定议题偏好"));
        // Default average length 100 → window [70, 130].
        assert!(prompt.contains("控制在70-130字符之间"));
    }

    #[test]
    fn test_media_prompt_focus_priority_listing() {
        let attrs = media_attrs();
        let prompt = media_prompt("议题", &attrs, "");
        // sample_row weights: EI_2 and EI_5 above 0.1.
        assert!(prompt.contains("- 外国政要涉台表态或访问: 50.0%"));
        assert!(prompt.contains("- 外媒涉台报道争议: 50.0%"));
        assert!(prompt.contains("**关注优先级**: 外国政要涉台表态/访问"));
    }

    #[test]
    fn test_user_prompt_attitude_banding() {
        let attrs = serde_json::json!({
            "nationality": "美国",
            "age": "35",
            "education": "硕士",
            "political_leaning": "自由派",
            "attitude_to_china": -0.4,
            "platform": "Twitter",
            "posting_style": "理性分析",
            "interests": ["国际政治", "外交政策"],
            "profession": "研究人员"
        });
        let prompt = user_prompt("台海局势与和平稳定", &attrs, "美国军舰再次穿越台湾海峡");
        assert!(prompt.contains("你是一位**美国**的社交媒体用户"));
        assert!(prompt.contains("**对华态度**: 质疑/批评"));
        assert!(prompt.contains("**兴趣领域**: 国际政治, 外交政策"));
        assert!(prompt.contains("短小精悍，常使用标签(#)，观点鲜明"));
        assert!(prompt.ends_with("请直接给出符合以上要求的评论内容，不要添加任何解释。"));
    }

    #[test]
    fn test_user_prompt_defaults() {
        let prompt = user_prompt("某议题", &Value::Null, "");
        assert!(prompt.contains("你是一位**未知**的社交媒体用户"));
        assert!(prompt.contains("**对华态度**: 中立"));
        assert!(prompt.contains("**看到的新闻/信息**: 关于某议题的新闻报道"));
        // No interests or influence lines when absent.
        assert!(!prompt.contains("兴趣领域"));
        assert!(!prompt.contains("影响力"));
    }

    #[test]
    fn test_attitude_bands() {
        assert_eq!(attitude_band(0.7), "非常友好/积极支持");
        assert_eq!(attitude_band(0.5), "友好/支持");
        assert_eq!(attitude_band(0.0), "中立/客观");
        assert_eq!(attitude_band(-0.4), "质疑/批评");
        assert_eq!(attitude_band(-0.9), "强烈反对/批评");
    }

    #[test]
    fn test_recommended_temperature_no_thresholds_crossed() {
        // Matches the documented reference point: nothing crosses a bracket.
        let temp = recommended_temperature(33.3, 66.7, 0.0);
        assert!((temp - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_recommended_temperature_adjustments() {
        // neutral>50 (+0.1) and challenge>70 (+0.1) → 0.9.
        assert!((recommended_temperature(60.0, 0.0, 80.0) - 0.9).abs() < 1e-9);
        // consistency>80 (-0.1) alone → 0.6.
        assert!((recommended_temperature(0.0, 90.0, 0.0) - 0.6).abs() < 1e-9);
        // neutral>30 (+0.05) and challenge>40 (+0.05) → 0.8.
        assert!((recommended_temperature(40.0, 0.0, 50.0) - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_recommended_temperature_clamped() {
        for neutral in [0.0, 40.0, 60.0] {
            for consistency in [0.0, 70.0, 90.0] {
                for challenge in [0.0, 50.0, 80.0] {
                    let temp = recommended_temperature(neutral, consistency, challenge);
                    assert!((0.3..=0.9).contains(&temp));
                }
            }
        }
    }

    #[test]
    fn test_build_style_description_composition() {
        let desc = build_style_description("客观中立型（带有共识导向）", "Aligned", 0.0);
        assert_eq!(desc, "客观、中立，寻求共识（低挑战性，以建设性提问为主），倾向于支持性、理解性提问");

        let desc = build_style_description("某未知风格", "Counter", 80.0);
        assert!(desc.starts_with("某未知风格（高挑战性"));
        assert!(desc.ends_with("倾向于质疑性、批判性提问"));
    }
}
