use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use uuid::Uuid;

use crate::models::AppState;
use crate::pipeline::{enter, Stage};
use crate::session::{session_cookie, session_id};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .with_state(state)
}

/// Terms page until the session accepts them, the form afterwards. First
/// visits get a session cookie.
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let (id, fresh) = match session_id(&headers) {
        Some(id) => (id, false),
        None => (Uuid::new_v4(), true),
    };

    let page = if state.sessions.terms_accepted(id).await {
        enter(Stage::CollectingInput);
        Html(form_page())
    } else {
        Html(TERMS_PAGE.replace("{{style}}", STYLE))
    };

    if fresh {
        ([(header::SET_COOKIE, session_cookie(id))], page).into_response()
    } else {
        page.into_response()
    }
}

fn form_page() -> String {
    let today = chrono::Local::now().date_naive().format("%Y-%m-%d").to_string();
    FORM_PAGE
        .replace("{{style}}", STYLE)
        .replace("{{today}}", &today)
}

const STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 2rem auto; max-width: 960px; color: #1d1d1f; }
    h1 { margin-bottom: 0.5rem; }
    .card { border: 1px solid #ddd; padding: 1rem; border-radius: 8px; margin-bottom: 1rem; }
    .field { display: grid; grid-template-columns: 2fr 1fr; gap: 1rem; margin-bottom: 1rem; }
    label { display: block; margin-top: 0.75rem; font-weight: 600; }
    input, textarea, select { width: 100%; padding: 0.5rem; box-sizing: border-box; }
    button { margin-top: 1rem; padding: 0.6rem 1rem; }
    .notice { background: #eef6ff; border-left: 4px solid #3b82f6; padding: 0.75rem; }
"#;

const TERMS_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Psicólogo Assistente - Termos de Uso</title>
  <style>{{style}}</style>
</head>
<body>
  <h1>Termos de Uso e Política de Privacidade</h1>
  <div class="card">
    <h3>Compromisso com a ética, segurança e sigilo profissional</h3>
    <p>Este serviço é uma ferramenta de apoio técnico à elaboração de documentos psicológicos,
    com base nas diretrizes da <strong>Resolução CFP nº 06/2019</strong>, da
    <strong>Resolução CFP nº 01/2009</strong> e do <strong>Código de Ética Profissional do Psicólogo</strong>.</p>

    <h3>Responsabilidade técnica e ética</h3>
    <p>Os documentos produzidos devem <strong>obrigatoriamente ser revisados, validados e assinados
    por psicóloga(o) inscrita(o) no CRP</strong>. O conteúdo gerado não substitui o julgamento
    clínico e técnico do profissional.</p>

    <h3>Finalidade do sistema</h3>
    <p>O assistente auxilia na sistematização de informações, organização textual e conformidade
    estrutural dos documentos, respeitando autonomia, consentimento informado, sigilo e não exposição.</p>

    <h3>Referências normativas</h3>
    <ul>
      <li>Resolução CFP nº 06/2019 – Elaboração de Documentos Escritos Produzidos pela(o) Psicóloga(o)</li>
      <li>Código de Ética Profissional do Psicólogo – Artigos 1º, 9º, 13º e 14º</li>
      <li>Resolução CFP nº 11/2018 – Uso de tecnologias da informação e comunicação</li>
      <li>Lei nº 13.709/2018 (LGPD) – Proteção de dados pessoais</li>
    </ul>

    <h3>Privacidade</h3>
    <p>Os arquivos e textos enviados são usados apenas para gerar o documento solicitado e não
    são armazenados por este serviço.</p>

    <p><strong>Ao utilizar este sistema, você declara que respeita os preceitos éticos da profissão e
    assume a responsabilidade técnica e legal pelos documentos emitidos com o apoio desta ferramenta.</strong></p>
  </div>
  <form method="post" action="/terms/accept">
    <button type="submit">Aceito os Termos e Continuar</button>
  </form>
</body>
</html>"#;

const FORM_PAGE: &str = r#"<!doctype html>
<html lang="pt-BR">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Psicólogo Assistente</title>
  <style>{{style}}</style>
</head>
<body>
  <h1>Psicólogo Assistente</h1>
  <hr />

  <form id="documentForm">
    <div class="card">
      <label for="name">Seu Nome Completo</label>
      <input id="name" name="name" />
      <label for="crp">CRP</label>
      <input id="crp" name="crp" maxlength="10" />
      <label for="date">Data</label>
      <input id="date" name="date" type="date" value="{{today}}" />
      <p id="greeting"></p>
    </div>

    <div class="card">
      <label for="documentType">Selecione o tipo de documento que você quer assistência na elaboração</label>
      <select id="documentType" name="document_type"></select>
    </div>

    <div class="card" id="fields"></div>

    <button type="submit" id="generateBtn">Gerar Documento</button>
  </form>

  <div class="card" id="resultCard" hidden>
    <h2>Documento Gerado</h2>
    <p id="resultDate"></p>
    <textarea id="result" rows="20"></textarea>
    <button id="downloadBtn">Baixar .docx</button>
    <p class="notice">Este documento deve ser revisado pelo psicólogo responsável antes do uso oficial.</p>
  </div>

  <script>
    const form = document.getElementById('documentForm');
    const typeSelect = document.getElementById('documentType');
    const fieldsBox = document.getElementById('fields');
    const greeting = document.getElementById('greeting');
    const resultCard = document.getElementById('resultCard');
    const result = document.getElementById('result');
    const generateBtn = document.getElementById('generateBtn');
    let catalog = [];
    let lastDocumentType = null;

    function updateGreeting() {
      const name = document.getElementById('name').value.trim();
      const crp = document.getElementById('crp').value.trim();
      greeting.textContent = name && crp ? `Olá, ${name}! | CRP: ${crp}` : '';
    }
    document.getElementById('name').addEventListener('input', updateGreeting);
    document.getElementById('crp').addEventListener('input', updateGreeting);

    function renderFields() {
      const entry = catalog.find(e => e.document_type === typeSelect.value);
      fieldsBox.innerHTML = '';
      (entry ? entry.fields : []).forEach(field => {
        const row = document.createElement('div');
        row.className = 'field';
        const left = document.createElement('div');
        const title = document.createElement('strong');
        title.textContent = field;
        const hint = document.createElement('label');
        hint.textContent = 'opção: anexe um documento que contenha a informação.';
        const text = document.createElement('textarea');
        text.name = 'text:' + field;
        text.rows = 3;
        left.append(title, hint, text);
        const right = document.createElement('div');
        const fileLabel = document.createElement('label');
        fileLabel.textContent = 'Anexar arquivo';
        const files = document.createElement('input');
        files.type = 'file';
        files.multiple = true;
        files.accept = '.pdf,.docx,.png,.jpg,.jpeg';
        files.name = 'file:' + field;
        right.append(fileLabel, files);
        row.append(left, right);
        fieldsBox.append(row);
      });
    }

    fetch('/api/catalog').then(r => r.json()).then(entries => {
      catalog = entries;
      entries.forEach(e => {
        const option = document.createElement('option');
        option.value = e.document_type;
        option.textContent = e.document_type;
        typeSelect.append(option);
      });
      renderFields();
    });
    typeSelect.addEventListener('change', renderFields);

    form.addEventListener('submit', async (event) => {
      event.preventDefault();
      generateBtn.disabled = true;
      generateBtn.textContent = 'Gerando...';
      try {
        const res = await fetch('/api/documents', { method: 'POST', body: new FormData(form) });
        const json = await res.json();
        if (!res.ok) {
          alert(json.error || 'Falha ao gerar o documento.');
          return;
        }
        lastDocumentType = json.document_type;
        result.value = json.content;
        document.getElementById('resultDate').textContent = json.date ? `Data: ${json.date}` : '';
        resultCard.hidden = false;
      } finally {
        generateBtn.disabled = false;
        generateBtn.textContent = 'Gerar Documento';
      }
    });

    document.getElementById('downloadBtn').addEventListener('click', async () => {
      const res = await fetch('/api/documents/export', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ document_type: lastDocumentType, content: result.value })
      });
      if (!res.ok) {
        alert('Falha ao exportar o documento.');
        return;
      }
      const disposition = res.headers.get('Content-Disposition') || '';
      const match = disposition.match(/filename="([^"]+)"/);
      const link = document.createElement('a');
      link.href = URL.createObjectURL(await res.blob());
      link.download = match ? match[1] : 'documento.docx';
      link.click();
      URL.revokeObjectURL(link.href);
    });
  </script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistant::tests::FakeBackend;
    use crate::routes::tests::{accepted_state, body_string, get, test_state};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn backend() -> Arc<FakeBackend> {
        Arc::new(FakeBackend::replying(Vec::new(), Vec::new()))
    }

    #[tokio::test]
    async fn test_first_visit_sees_terms_and_gets_cookie() {
        let response = router(test_state(backend())).oneshot(get("/", None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(header::SET_COOKIE));
        let body = body_string(response).await;
        assert!(body.contains("Termos de Uso"));
        assert!(!body.contains("documentForm"));
    }

    #[tokio::test]
    async fn test_accepted_session_sees_form() {
        let (state, id) = accepted_state(backend()).await;

        let response = router(state).oneshot(get("/", Some(id))).await.unwrap();

        assert!(!response.headers().contains_key(header::SET_COOKIE));
        let body = body_string(response).await;
        assert!(body.contains("documentForm"));
        assert!(body.contains(r#"maxlength="10""#));
        assert!(!body.contains("{{today}}"));
    }
}
