//! Survey documents: the legacy single form and the one-question-per-page flow.
//!
//! The paged flow keeps all state client-side. On completion it posts the
//! submission payload (see `submission`) to the host as a `prompt` action.

use std::ops::RangeInclusive;

use serde::Serialize;

use crate::render::html::{escape, sanitize_color, script_json, Document};
use crate::resources::{
    ChoiceOption, FieldType, MultipleChoicePage, RatingPage, Survey, SurveyBody, SurveyField,
    SurveyPage, SurveyTheme, TextInputPage,
};

/// State handed to the client-side behavior.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientState<'a> {
    survey_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pages: Option<&'a [SurveyPage]>,
}

/// Most stars a rating ever renders, however wide the configured range.
pub const MAX_RATING_STEPS: i64 = 11;

/// Star values from `min`, capped at `MAX_RATING_STEPS` entries.
fn rating_steps(min: i64, max: i64) -> RangeInclusive<i64> {
    let last = max.min(min.saturating_add(MAX_RATING_STEPS - 1));
    min..=last
}

pub fn render(survey: &Survey, default_color: &str) -> Result<String, serde_json::Error> {
    match &survey.body {
        SurveyBody::Fields(fields) => render_form(survey, fields, default_color),
        SurveyBody::Pages(pages) => render_pages(survey, pages, default_color),
    }
}

fn theme_styles(survey: &Survey, default_color: &str) -> String {
    let styling = survey.styling.as_ref();
    let color = styling
        .and_then(|s| s.primary_color.as_deref())
        .map(|c| sanitize_color(c, default_color))
        .unwrap_or_else(|| sanitize_color(default_color, "#007bff"));
    let background = match styling.map(|s| s.theme).unwrap_or_default() {
        SurveyTheme::Default => "#f5f5f5".to_string(),
        SurveyTheme::Minimal => "#ffffff".to_string(),
        SurveyTheme::Gradient => format!("linear-gradient(135deg, {} 0%, #764ba2 100%)", color),
    };
    format!(
        "    :root {{ --primary: {}; --page-background: {}; }}\n{}",
        color, background, SHARED_STYLES
    )
}

fn required_mark(required: bool) -> &'static str {
    if required {
        " <span class=\"required\">*</span>"
    } else {
        ""
    }
}

// --- Legacy single form ---

fn render_form(survey: &Survey, fields: &[SurveyField], default_color: &str) -> Result<String, serde_json::Error> {
    let fields_html = fields.iter().map(field_markup).collect::<Vec<_>>().join("\n");
    let description = survey
        .description
        .as_deref()
        .map(|d| format!("<p class=\"description\">{}</p>", escape(d)))
        .unwrap_or_default();

    let body = format!(
        "<div class=\"survey-container\">\n<h1>{}</h1>\n{}\n<form id=\"surveyForm\">\n{}\n<button type=\"submit\" class=\"btn-submit\">Submit</button>\n</form>\n</div>",
        escape(&survey.title),
        description,
        fields_html
    );

    let script = format!(
        "const SURVEY = {};\n{}",
        script_json(&ClientState { survey_id: &survey.id, pages: None })?,
        FORM_BEHAVIOR
    );
    let styles = theme_styles(survey, default_color) + FORM_STYLES;

    Ok(Document::new(&survey.title, &styles, body).with_script(script).render())
}

fn field_markup(field: &SurveyField) -> String {
    let id = escape(&field.id);
    let required = if field.required { " required" } else { "" };
    let placeholder = escape(field.placeholder.as_deref().unwrap_or(""));
    let bound = |name: &str, value: Option<f64>| value.map(|v| format!(" {}=\"{}\"", name, v)).unwrap_or_default();

    let input = match field.field_type {
        FieldType::Text | FieldType::Email => {
            let kind = if field.field_type == FieldType::Email { "email" } else { "text" };
            let rules = field.validation.as_ref();
            format!(
                "<input type=\"{}\" name=\"{}\" placeholder=\"{}\"{}{}{}{}>",
                kind,
                id,
                placeholder,
                rules
                    .and_then(|r| r.min_length)
                    .map(|n| format!(" minlength=\"{}\"", n))
                    .unwrap_or_default(),
                rules
                    .and_then(|r| r.max_length)
                    .map(|n| format!(" maxlength=\"{}\"", n))
                    .unwrap_or_default(),
                rules
                    .and_then(|r| r.pattern.as_deref())
                    .map(|p| format!(" pattern=\"{}\"", escape(p)))
                    .unwrap_or_default(),
                required
            )
        }
        FieldType::Textarea => format!(
            "<textarea name=\"{}\" placeholder=\"{}\"{}></textarea>",
            id, placeholder, required
        ),
        FieldType::Number => format!(
            "<input type=\"number\" name=\"{}\"{}{}{}>",
            id,
            bound("min", field.min),
            bound("max", field.max),
            required
        ),
        FieldType::Date => format!("<input type=\"date\" name=\"{}\"{}>", id, required),
        FieldType::File => format!("<input type=\"file\" name=\"{}\"{}>", id, required),
        FieldType::Rating => {
            let min = field.min.map(|m| m as i64).unwrap_or(1);
            let max = field.max.map(|m| m as i64).unwrap_or(5);
            let stars = rating_steps(min, max)
                .map(|i| {
                    format!(
                        "<input type=\"radio\" name=\"{id}\" value=\"{i}\" id=\"{id}_{i}\"{req}><label for=\"{id}_{i}\">&#9733;</label>",
                        id = id,
                        i = i,
                        req = required
                    )
                })
                .collect::<String>();
            format!("<div class=\"rating\">{}</div>", stars)
        }
        FieldType::SingleChoice | FieldType::MultipleChoice => {
            let single = field.field_type == FieldType::SingleChoice;
            let (group, kind) = if single { ("radio-group", "radio") } else { ("checkbox-group", "checkbox") };
            let max = field
                .max_selections
                .filter(|_| !single)
                .map(|n| format!(" data-max-selections=\"{}\"", n))
                .unwrap_or_default();
            let options = field
                .options
                .iter()
                .flatten()
                .enumerate()
                .map(|(index, option)| {
                    format!(
                        "<div class=\"{kind}-option\"><input type=\"{kind}\" name=\"{id}\" value=\"{value}\" id=\"{id}_{index}\"{req}><label for=\"{id}_{index}\">{value}</label></div>",
                        kind = kind,
                        id = id,
                        value = escape(option),
                        index = index,
                        req = if single { required } else { "" }
                    )
                })
                .collect::<String>();
            format!("<div class=\"{}\"{}>{}</div>", group, max, options)
        }
    };

    let description = field
        .description
        .as_deref()
        .map(|d| format!("<div class=\"field-description\">{}</div>", escape(d)))
        .unwrap_or_default();

    format!(
        "<div class=\"field\"><label>{}{}</label>{}{}</div>",
        escape(&field.label),
        required_mark(field.required),
        input,
        description
    )
}

// --- Paged flow ---

fn render_pages(survey: &Survey, pages: &[SurveyPage], default_color: &str) -> Result<String, serde_json::Error> {
    let show_progress = survey.styling.as_ref().map_or(true, |s| s.show_progress);
    let progress = if show_progress {
        "<div class=\"progress-container\"><div class=\"progress-bar\"></div></div>"
    } else {
        ""
    };

    let pages_html = pages
        .iter()
        .enumerate()
        .map(|(index, page)| page_markup(index, page))
        .collect::<Vec<_>>()
        .join("\n");

    let body = format!(
        "<div class=\"survey-container\">\n{progress}\n<div class=\"page-number\"><span class=\"current-page\">1</span> / <span class=\"total-pages\">{total}</span></div>\n{pages}\n<div class=\"survey-nav\"><button class=\"btn-back\" type=\"button\">Back</button><button class=\"btn-next\" type=\"button\">Next</button></div>\n</div>",
        progress = progress,
        total = pages.len(),
        pages = pages_html
    );

    let script = format!(
        "const SURVEY = {};\n{}",
        script_json(&ClientState { survey_id: &survey.id, pages: Some(pages) })?,
        PAGED_BEHAVIOR
    );
    let styles = theme_styles(survey, default_color) + PAGED_STYLES;

    Ok(Document::new(&survey.title, &styles, body).with_script(script).render())
}

fn page_markup(index: usize, page: &SurveyPage) -> String {
    let description = page
        .description()
        .map(|d| format!("<p class=\"page-description\">{}</p>", escape(d)))
        .unwrap_or_default();

    let content = match page {
        SurveyPage::TextInput(p) => text_input(p),
        SurveyPage::MultipleChoice(p) => multiple_choice(p),
        SurveyPage::Rating(p) => rating(p),
    };

    format!(
        "<div class=\"survey-page\" data-page-index=\"{index}\" style=\"display: {display};\">\
<h2 class=\"page-title\">{title}{mark}</h2>{description}{content}\
<div class=\"validation-message\" aria-live=\"polite\"></div></div>",
        index = index,
        display = if index == 0 { "block" } else { "none" },
        title = escape(page.title()),
        mark = required_mark(page.required()),
        description = description,
        content = content,
    )
}

fn text_input(page: &TextInputPage) -> String {
    let max = page
        .validation
        .as_ref()
        .and_then(|v| v.max_length)
        .map(|n| format!(" maxlength=\"{}\"", n))
        .unwrap_or_default();
    format!(
        "<textarea class=\"text-answer\" rows=\"{}\" placeholder=\"{}\"{}></textarea>",
        page.rows,
        escape(page.placeholder.as_deref().unwrap_or("")),
        max
    )
}

fn multiple_choice(page: &MultipleChoicePage) -> String {
    let kind = if page.allow_multiple { "checkbox" } else { "radio" };
    let name = format!("page-{}", escape(&page.id));
    let options = page
        .options
        .iter()
        .map(|option| option_card(option, kind, &name))
        .collect::<String>();

    let hint = match page.max_selections.filter(|_| page.allow_multiple) {
        Some(n) => format!("<p class=\"selection-hint\">Select up to {}</p>", n),
        None => String::new(),
    };

    let custom = if page.allow_user_options {
        "<div class=\"custom-option\"><input type=\"text\" class=\"custom-option-input\" placeholder=\"Add your own option\">\
<button type=\"button\" class=\"btn-add-option\">Add</button></div><div class=\"custom-options\"></div>"
    } else {
        ""
    };

    format!("{}<div class=\"options-grid\">{}</div>{}", hint, options, custom)
}

fn option_card(option: &ChoiceOption, kind: &str, name: &str) -> String {
    let follow_up = option
        .follow_up_question
        .as_deref()
        .map(|q| {
            format!(
                "<div class=\"follow-up\" style=\"display: none;\"><label>{}</label><textarea class=\"follow-up-input\" rows=\"2\"></textarea></div>",
                escape(q)
            )
        })
        .unwrap_or_default();

    format!(
        "<div class=\"option-card\"><label class=\"option-label\"><input type=\"{kind}\" class=\"option-input\" name=\"{name}\" value=\"{value}\">\
<span class=\"option-text\">{label}</span></label>{follow_up}</div>",
        kind = kind,
        name = name,
        value = escape(&option.id),
        label = escape(&option.label),
        follow_up = follow_up,
    )
}

fn rating(page: &RatingPage) -> String {
    let stars = rating_steps(page.min, page.max)
        .map(|value| {
            format!(
                "<button type=\"button\" class=\"rating-star\" data-value=\"{v}\" aria-label=\"{v}\">&#9733;</button>",
                v = value
            )
        })
        .collect::<String>();

    let labels = page
        .labels
        .as_ref()
        .map(|l| {
            format!(
                "<div class=\"rating-labels\"><span>{}</span><span>{}</span></div>",
                escape(l.min.as_deref().unwrap_or("")),
                escape(l.max.as_deref().unwrap_or(""))
            )
        })
        .unwrap_or_default();

    format!(
        "<div class=\"rating-container\">{}</div>{}<input type=\"hidden\" class=\"rating-value\" value=\"\">",
        stars, labels
    )
}

const FORM_BEHAVIOR: &str = r#"(function () {
  document.querySelectorAll('.rating').forEach(function (group) {
    var inputs = Array.prototype.slice.call(group.querySelectorAll('input'));
    var labels = Array.prototype.slice.call(group.querySelectorAll('label'));
    inputs.forEach(function (input) {
      input.addEventListener('change', function () {
        var value = parseInt(input.value, 10);
        labels.forEach(function (label, i) {
          label.classList.toggle('selected', parseInt(inputs[i].value, 10) <= value);
        });
      });
    });
  });

  document.querySelectorAll('.checkbox-group[data-max-selections]').forEach(function (group) {
    var max = parseInt(group.getAttribute('data-max-selections'), 10);
    group.addEventListener('change', function (e) {
      if (group.querySelectorAll('input:checked').length > max) { e.target.checked = false; }
    });
  });

  document.getElementById('surveyForm').addEventListener('submit', function (e) {
    e.preventDefault();
    var responses = {};
    new FormData(e.target).forEach(function (value, key) {
      if (responses[key] === undefined) { responses[key] = value; }
      else if (Array.isArray(responses[key])) { responses[key].push(value); }
      else { responses[key] = [responses[key], value]; }
    });
    var data = { surveyId: SURVEY.surveyId, responses: responses, metadata: { completedAt: new Date().toISOString() } };
    var prompt = 'Survey submitted\n\n=== Structured Data ===\n```json\n' + JSON.stringify(data, null, 2) + '\n```\n';
    if (window.parent && window.parent !== window) {
      window.parent.postMessage({ type: 'prompt', payload: { prompt: prompt } }, '*');
    }
    window.dispatchEvent(new CustomEvent('survey-complete', { detail: { type: 'survey_complete', surveyId: SURVEY.surveyId, responses: responses } }));
    e.target.innerHTML = '<p class="completion-text">Thank you! Your responses have been recorded.</p>';
  });
})();"#;

const PAGED_BEHAVIOR: &str = r#"(function () {
  var pages = SURVEY.pages;
  var totalPages = pages.length;
  var pageEls = Array.prototype.slice.call(document.querySelectorAll('.survey-page'));
  var btnNext = document.querySelector('.btn-next');
  var btnBack = document.querySelector('.btn-back');
  var responses = {};
  var customOptions = {};
  var currentPage = 0;
  var startTime = Date.now();

  function selected(el) {
    return Array.prototype.slice.call(el.querySelectorAll('.option-input:checked'));
  }

  function problem(index) {
    var page = pages[index];
    var el = pageEls[index];
    if (page.type === 'textInput') {
      var value = el.querySelector('.text-answer').value.trim();
      if (!value) { return page.required ? 'This question is required' : null; }
      var rules = page.validation || {};
      var message = rules.message;
      if (rules.minLength !== undefined && value.length < rules.minLength) {
        return message || ('Please enter at least ' + rules.minLength + ' characters');
      }
      if (rules.maxLength !== undefined && value.length > rules.maxLength) {
        return message || ('Please enter at most ' + rules.maxLength + ' characters');
      }
      if (rules.pattern) {
        try {
          if (!new RegExp(rules.pattern).test(value)) { return message || 'Please match the requested format'; }
        } catch (err) { /* pattern not valid in this engine */ }
      }
      return null;
    }
    if (page.type === 'multipleChoice') {
      var count = selected(el).length + (customOptions[page.id] || []).length;
      if (page.required && count === 0) { return 'Please select an option'; }
      if (page.maxSelections && count > page.maxSelections) { return 'Select up to ' + page.maxSelections; }
      return null;
    }
    var rating = el.querySelector('.rating-value').value;
    return page.required && rating === '' ? 'Please choose a rating' : null;
  }

  function validatePage(index) {
    var issue = problem(index);
    var el = pageEls[index];
    var touched = el.getAttribute('data-touched') === 'true';
    el.querySelector('.validation-message').textContent = issue && touched ? issue : '';
    btnNext.disabled = issue !== null;
  }

  function showPage(index) {
    pageEls.forEach(function (el, i) { el.style.display = i === index ? 'block' : 'none'; });
    document.querySelector('.current-page').textContent = index + 1;
    var bar = document.querySelector('.progress-bar');
    if (bar) { bar.style.width = ((index + 1) / totalPages * 100) + '%'; }
    btnNext.textContent = index === totalPages - 1 ? 'Submit' : 'Next';
    btnBack.style.visibility = index === 0 ? 'hidden' : 'visible';
    validatePage(index);
  }

  function saveResponse(index) {
    var page = pages[index];
    var el = pageEls[index];
    if (page.type === 'textInput') {
      var value = el.querySelector('.text-answer').value;
      if (value.trim()) { responses[page.id] = { type: 'textInput', value: value }; } else { delete responses[page.id]; }
    } else if (page.type === 'multipleChoice') {
      var optionIds = [];
      var followUpAnswers = {};
      selected(el).forEach(function (input) {
        optionIds.push(input.value);
        var followUp = input.closest('.option-card').querySelector('.follow-up-input');
        if (followUp && followUp.value) { followUpAnswers[input.value] = followUp.value; }
      });
      var custom = (customOptions[page.id] || []).slice();
      if (optionIds.length || custom.length) {
        responses[page.id] = { type: 'multipleChoice', optionIds: optionIds, followUpAnswers: followUpAnswers, customOptions: custom };
      } else { delete responses[page.id]; }
    } else {
      var rating = el.querySelector('.rating-value').value;
      if (rating !== '') { responses[page.id] = { type: 'rating', value: parseInt(rating, 10) }; } else { delete responses[page.id]; }
    }
  }

  function formatTime(total) {
    var minutes = Math.floor(total / 60);
    var seconds = total % 60;
    return minutes > 0
      ? minutes + ' minute' + (minutes !== 1 ? 's' : '') + ' ' + seconds + ' seconds'
      : seconds + ' seconds';
  }

  function formatResults(metadata) {
    var text = 'Survey completed in ' + formatTime(metadata.timeSpent) + '\n\n';
    text += '=== Survey Responses ===\n\n';
    pages.forEach(function (page, index) {
      var response = responses[page.id];
      if (!response) { return; }
      text += (index + 1) + '. ' + page.title + '\n';
      if (response.type === 'textInput') {
        text += '   Answer: "' + response.value + '"\n\n';
      } else if (response.type === 'multipleChoice') {
        var lines = page.options
          .filter(function (opt) { return response.optionIds.indexOf(opt.id) !== -1; })
          .map(function (opt) {
            var line = '• ' + opt.label;
            if (response.followUpAnswers[opt.id]) { line += '\n     Follow-up: "' + response.followUpAnswers[opt.id] + '"'; }
            return line;
          })
          .concat(response.customOptions.map(function (label) { return '• ' + label; }));
        text += '   Selected:\n   ' + lines.join('\n   ') + '\n\n';
      } else {
        text += '   Rating: ' + response.value + ' / ' + page.max + '\n\n';
      }
    });
    text += '\n=== Structured Data ===\n';
    text += '```json\n';
    text += JSON.stringify({ surveyId: SURVEY.surveyId, responses: responses, metadata: metadata }, null, 2);
    text += '\n```\n';
    return text;
  }

  function complete() {
    var metadata = {
      completedAt: new Date().toISOString(),
      pageCount: totalPages,
      timeSpent: Math.floor((Date.now() - startTime) / 1000)
    };
    var prompt = formatResults(metadata);
    var messageId = (window.crypto && window.crypto.randomUUID) ? window.crypto.randomUUID() : String(Date.now());
    if (window.parent && window.parent !== window) {
      window.parent.postMessage({ type: 'prompt', payload: { prompt: prompt }, messageId: messageId }, '*');
    }
    window.dispatchEvent(new CustomEvent('survey-complete', {
      detail: { type: 'survey_complete', surveyId: SURVEY.surveyId, responses: responses, metadata: metadata }
    }));
    document.querySelector('.survey-container').innerHTML =
      '<div class="completion-message"><h2 class="completion-title">Thank You!</h2>' +
      '<p class="completion-text">Your responses have been recorded.</p></div>';
  }

  pageEls.forEach(function (el, index) {
    var page = pages[index];
    el.addEventListener('input', function () { el.setAttribute('data-touched', 'true'); validatePage(index); });
    el.addEventListener('change', function () { el.setAttribute('data-touched', 'true'); validatePage(index); });

    el.querySelectorAll('.option-card').forEach(function (card) {
      var input = card.querySelector('.option-input');
      var followUp = card.querySelector('.follow-up');
      input.addEventListener('change', function () {
        el.querySelectorAll('.option-card').forEach(function (other) {
          var checked = other.querySelector('.option-input').checked;
          other.classList.toggle('selected', checked);
          var otherFollowUp = other.querySelector('.follow-up');
          if (otherFollowUp) { otherFollowUp.style.display = checked ? 'block' : 'none'; }
        });
        if (followUp && input.checked) { followUp.querySelector('textarea').focus(); }
      });
    });

    var addButton = el.querySelector('.btn-add-option');
    if (addButton) {
      addButton.addEventListener('click', function () {
        var field = el.querySelector('.custom-option-input');
        var label = field.value.trim();
        if (!label) { return; }
        (customOptions[page.id] = customOptions[page.id] || []).push(label);
        var chip = document.createElement('span');
        chip.className = 'custom-option-chip';
        chip.textContent = label;
        el.querySelector('.custom-options').appendChild(chip);
        field.value = '';
        el.setAttribute('data-touched', 'true');
        validatePage(index);
      });
    }

    var stars = Array.prototype.slice.call(el.querySelectorAll('.rating-star'));
    stars.forEach(function (star) {
      star.addEventListener('click', function () {
        var value = parseInt(star.getAttribute('data-value'), 10);
        el.querySelector('.rating-value').value = String(value);
        stars.forEach(function (s) { s.classList.toggle('selected', parseInt(s.getAttribute('data-value'), 10) <= value); });
        el.setAttribute('data-touched', 'true');
        validatePage(index);
      });
    });
  });

  btnNext.addEventListener('click', function () {
    pageEls[currentPage].setAttribute('data-touched', 'true');
    if (problem(currentPage) !== null) { validatePage(currentPage); return; }
    saveResponse(currentPage);
    if (currentPage === totalPages - 1) { complete(); return; }
    currentPage += 1;
    showPage(currentPage);
  });

  btnBack.addEventListener('click', function () {
    if (currentPage === 0) { return; }
    saveResponse(currentPage);
    currentPage -= 1;
    showPage(currentPage);
  });

  showPage(0);
})();"#;

const SHARED_STYLES: &str = r#"    body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; max-width: 640px; margin: 0 auto; padding: 20px; background: var(--page-background); }
    .survey-container { background: white; border-radius: 12px; padding: 32px; box-shadow: 0 2px 8px rgba(0,0,0,0.1); }
    .required { color: #e74c3c; }
    .completion-message { text-align: center; padding: 48px 16px; }
    .completion-title { font-size: 1.75rem; color: #1a202c; margin-bottom: 8px; }
    .completion-text { color: #718096; }
"#;

const FORM_STYLES: &str = r#"    h1 { margin: 0 0 8px 0; font-size: 24px; color: #333; }
    .description { color: #666; margin-bottom: 24px; }
    .field { margin-bottom: 20px; }
    .field > label { display: block; font-weight: 500; margin-bottom: 8px; color: #333; }
    input[type="text"], input[type="email"], input[type="number"], input[type="date"], textarea { width: 100%; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 14px; box-sizing: border-box; }
    textarea { min-height: 100px; resize: vertical; }
    .rating { display: flex; gap: 8px; }
    .rating input { display: none; }
    .rating label { cursor: pointer; font-size: 24px; color: #ddd; }
    .rating label.selected { color: #f39c12; }
    .checkbox-group, .radio-group { display: flex; flex-direction: column; gap: 8px; }
    .checkbox-option, .radio-option { display: flex; align-items: center; gap: 8px; }
    .field-description { font-size: 12px; color: #888; margin-top: 4px; }
    .btn-submit { background: var(--primary); color: white; border: none; padding: 12px 24px; border-radius: 4px; font-size: 16px; cursor: pointer; }
"#;

const PAGED_STYLES: &str = r#"    .progress-container { height: 6px; background: #edf2f7; border-radius: 3px; overflow: hidden; margin-bottom: 16px; }
    .progress-bar { height: 100%; width: 0; background: var(--primary); transition: width 0.3s ease; }
    .page-number { font-size: 0.875rem; color: #a0aec0; margin-bottom: 24px; }
    .page-title { font-size: 1.75rem; font-weight: 700; color: #1a202c; margin: 0 0 12px 0; }
    .page-description { font-size: 1.05rem; color: #718096; margin-bottom: 24px; }
    .text-answer, .follow-up-input, .custom-option-input { width: 100%; padding: 12px; border: 2px solid #e2e8f0; border-radius: 8px; font-size: 1rem; box-sizing: border-box; font-family: inherit; }
    .options-grid { display: grid; grid-template-columns: repeat(2, 1fr); gap: 12px; }
    .option-card { border: 2px solid #e2e8f0; border-radius: 8px; padding: 12px; cursor: pointer; }
    .option-card.selected { border-color: var(--primary); background: #f7fafc; }
    .option-label { display: flex; align-items: center; gap: 8px; cursor: pointer; }
    .follow-up { margin-top: 8px; font-size: 0.875rem; color: #4a5568; }
    .selection-hint { font-size: 0.875rem; color: #718096; }
    .custom-option { display: flex; gap: 8px; margin-top: 12px; }
    .custom-option-chip { display: inline-block; background: #edf2f7; border-radius: 12px; padding: 4px 10px; margin: 8px 8px 0 0; font-size: 0.875rem; }
    .btn-add-option { padding: 8px 16px; border: none; border-radius: 8px; background: #edf2f7; cursor: pointer; }
    .rating-container { display: flex; gap: 8px; }
    .rating-star { background: none; border: none; font-size: 2.5rem; color: #e2e8f0; cursor: pointer; }
    .rating-star.selected { color: #f6ad55; }
    .rating-labels { display: flex; justify-content: space-between; font-size: 0.875rem; color: #718096; margin-top: 8px; }
    .validation-message { color: #e53e3e; font-size: 0.875rem; min-height: 1.25rem; margin-top: 8px; }
    .survey-nav { display: flex; justify-content: space-between; margin-top: 32px; }
    .btn-back { background: none; border: 2px solid #e2e8f0; padding: 12px 24px; border-radius: 8px; cursor: pointer; visibility: hidden; }
    .btn-next { background: var(--primary); color: white; border: none; padding: 14px 40px; border-radius: 8px; font-size: 1.05rem; font-weight: 600; cursor: pointer; }
    .btn-next:disabled { opacity: 0.5; cursor: not-allowed; }
    @media (max-width: 640px) { .options-grid { grid-template-columns: 1fr; } .survey-container { padding: 24px; } }
"#;
