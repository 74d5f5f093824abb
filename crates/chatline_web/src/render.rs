//! HTML rendering for the chat page.
//!
//! Pages are assembled from strings; every piece of user or model text goes
//! through [`escape_html`] first.

use chatline_core::{Exchange, Sentiment, Variant};

/// Background of a reply that has not arrived
pub const PENDING_COLOR: &str = "#888";

/// Text shown in place of a reply that has not arrived
pub const PENDING_TEXT: &str = "🤖 ...";

const MULTI_STYLE: &str = r#"
body {
    font-family: sans-serif;
    margin: 0;
    padding: 2rem;
    min-height: 100vh;
    background: linear-gradient(to bottom right, #e0f7fa, #ffe0b2);
}
h1 { text-align: center; color: #4B0082; }
.subtitle { text-align: center; color: #555; }
.row { display: grid; grid-template-columns: 1fr 3fr; gap: 1rem; }
.user-message {
    background-color: #FFD700;
    padding: 12px;
    border-radius: 15px;
    margin-bottom: 5px;
    text-align: right;
    font-weight: bold;
}
.bot-message {
    padding: 12px;
    border-radius: 15px;
    margin-bottom: 5px;
    font-weight: bold;
    color: white;
}
.error { background: #fdecea; color: #611a15; padding: 12px; border-radius: 8px; }
"#;

const SINGLE_STYLE: &str = r#"
body { font-family: sans-serif; margin: 0 auto; padding: 2rem; max-width: 48rem; }
.error { background: #fdecea; color: #611a15; padding: 12px; border-radius: 8px; }
"#;

// Shows the submitted text and a pending bubble while the form post is in flight.
const TYPING_SCRIPT: &str = r#"
document.getElementById('chat-form').addEventListener('submit', function (event) {
    var input = document.getElementById('message');
    if (input.value.trim() === '') { event.preventDefault(); return; }
    var row = document.createElement('div');
    row.className = 'row';
    var user = document.createElement('div');
    user.className = 'user-message';
    user.textContent = '👤 ' + input.value;
    var bot = document.createElement('div');
    bot.className = 'bot-message';
    bot.style.backgroundColor = '#888';
    bot.textContent = '🤖 ...';
    row.appendChild(user);
    row.appendChild(bot);
    document.getElementById('history').appendChild(row);
    document.getElementById('send').disabled = true;
});
"#;

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Page heading for a variant
pub fn title(variant: Variant) -> &'static str {
    match variant {
        Variant::SingleAgent => "Single-Agent Chatbot",
        Variant::MultiAgent => "🤖 Multi-Agent Chatbot",
    }
}

/// Render the full chat page
pub fn render_page(variant: Variant, exchanges: &[Exchange], error: Option<&str>) -> String {
    match variant {
        Variant::SingleAgent => single_page(exchanges, error),
        Variant::MultiAgent => multi_page(exchanges, error),
    }
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!("<div class=\"error\" role=\"alert\">{}</div>\n", escape_html(e)))
        .unwrap_or_default()
}

fn single_page(exchanges: &[Exchange], error: Option<&str>) -> String {
    let mut history = String::new();
    for exchange in exchanges {
        history.push_str(&format!(
            "<p><strong>You:</strong> {}</p>\n",
            escape_html(&exchange.user.content)
        ));
        if let Some(reply) = &exchange.reply {
            history.push_str(&format!(
                "<p><strong>Assistant:</strong> {}</p>\n",
                escape_html(&reply.content)
            ));
        }
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
{banner}<form id="chat-form" method="post" action="/send">
<label for="message">You:</label>
<input id="message" name="message" type="text" autocomplete="off" autofocus>
<button id="send" type="submit">Send</button>
</form>
<div id="history">
{history}</div>
</body>
</html>
"#,
        title = title(Variant::SingleAgent),
        style = SINGLE_STYLE,
        banner = error_banner(error),
        history = history,
    )
}

fn bot_bubble(exchange: &Exchange) -> String {
    match &exchange.reply {
        Some(reply) => {
            let sentiment = exchange.sentiment.unwrap_or_default();
            format!(
                "<div class=\"bot-message\" style=\"background-color:{};\">🤖 {} {}<br><small>Sentiment: {}</small></div>",
                sentiment.color(),
                escape_html(&reply.content),
                sentiment.emoji(),
                sentiment_label(exchange.sentiment),
            )
        }
        None => format!(
            "<div class=\"bot-message\" style=\"background-color:{};\">{}</div>",
            PENDING_COLOR, PENDING_TEXT
        ),
    }
}

fn sentiment_label(sentiment: Option<Sentiment>) -> &'static str {
    sentiment.unwrap_or_default().as_str()
}

fn multi_page(exchanges: &[Exchange], error: Option<&str>) -> String {
    let mut history = String::new();
    for exchange in exchanges {
        history.push_str(&format!(
            "<div class=\"row\"><div class=\"user-message\">👤 {}</div>{}</div>\n",
            escape_html(&exchange.user.content),
            bot_bubble(exchange),
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Multi-Agent Chatbot</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
<p class="subtitle">A colorful chat with background, emojis, and sentiment highlights!</p>
{banner}<form id="chat-form" method="post" action="/send">
<label for="message">Your Message:</label>
<input id="message" name="message" type="text" autocomplete="off" autofocus>
<button id="send" type="submit">Send</button>
</form>
<div id="history">
{history}</div>
<script>{script}</script>
</body>
</html>
"#,
        style = MULTI_STYLE,
        title = title(Variant::MultiAgent),
        banner = error_banner(error),
        history = history,
        script = TYPING_SCRIPT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chatline_core::Turn;

    fn exchange(user: &str, reply: Option<&str>, sentiment: Option<Sentiment>) -> Exchange {
        Exchange {
            user: Turn::user(user),
            reply: reply.map(Turn::assistant),
            sentiment,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom" & 'Jerry'</b>"#),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
        assert_eq!(escape_html("plain text"), "plain text");
    }

    #[test]
    fn test_multi_page_colors() {
        let page = render_page(
            Variant::MultiAgent,
            &[
                exchange("I am happy", Some("Great!"), Some(Sentiment::Positive)),
                exchange("bad day", Some("Sorry"), Some(Sentiment::Negative)),
                exchange("cloudy", Some("Indeed"), Some(Sentiment::Neutral)),
            ],
            None,
        );
        assert!(page.contains("background-color:#32CD32;\">🤖 Great! 😄"));
        assert!(page.contains("background-color:#FF6347;\">🤖 Sorry 😟"));
        assert!(page.contains("background-color:#A9A9A9;\">🤖 Indeed 😐"));
        assert!(page.contains("Sentiment: negative"));
        assert!(!page.contains("role=\"alert\""));
    }

    #[test]
    fn test_multi_page_pending_reply() {
        let page = render_page(
            Variant::MultiAgent,
            &[exchange("hello", None, None)],
            Some("Responder error: timeout"),
        );
        assert!(page.contains("background-color:#888;\">🤖 ...</div>"));
        assert!(page.contains("role=\"alert\">Responder error: timeout</div>"));
    }

    #[test]
    fn test_absent_sentiment_renders_neutral() {
        let page = render_page(
            Variant::MultiAgent,
            &[exchange("hi", Some("hello"), None)],
            None,
        );
        assert!(page.contains("#A9A9A9"));
        assert!(page.contains("Sentiment: neutral"));
    }

    #[test]
    fn test_single_page() {
        let page = render_page(
            Variant::SingleAgent,
            &[
                exchange("hi", Some("hello"), None),
                exchange("still there?", None, None),
            ],
            None,
        );
        assert!(page.contains("<h1>Single-Agent Chatbot</h1>"));
        assert!(page.contains("<p><strong>You:</strong> hi</p>"));
        assert!(page.contains("<p><strong>Assistant:</strong> hello</p>"));
        assert!(page.contains("<p><strong>You:</strong> still there?</p>"));
        assert!(!page.contains("Sentiment"));
        assert!(!page.contains(PENDING_TEXT));
    }

    #[test]
    fn test_user_text_is_escaped() {
        let page = render_page(
            Variant::MultiAgent,
            &[exchange("<script>alert(1)</script>", Some("<i>x</i>"), None)],
            None,
        );
        assert!(!page.contains("<script>alert(1)</script>"));
        assert!(page.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(page.contains("&lt;i&gt;x&lt;/i&gt;"));
    }
}
