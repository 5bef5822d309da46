//! CSS styles for the notes application.

// ============================================================================
// CSS Styles
// ============================================================================

pub const STYLE: &str = r#"
/* Solarized Light Theme */
:root {
    --base01: #586e75;
    --base00: #657b83;
    --base1: #93a1a1;
    --base2: #eee8d5;
    --base3: #fdf6e3;

    --yellow: #b58900;
    --orange: #cb4b16;
    --red: #dc322f;
    --blue: #268bd2;
    --cyan: #2aa198;
    --green: #859900;

    --bg: var(--base3);
    --fg: var(--base00);
    --muted: var(--base1);
    --border: var(--base2);
    --link: var(--blue);
    --link-hover: var(--cyan);
    --accent: var(--base2);
    --code-bg: var(--base2);
}

* { box-sizing: border-box; margin: 0; padding: 0; }

body {
    line-height: 1.6;
    color: var(--fg);
    background: var(--bg);
    height: 100vh;
    overflow: hidden;
}

.font-sans { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, "Helvetica Neue", Arial, sans-serif; }
.font-serif { font-family: Georgia, "Times New Roman", serif; }
.font-mono { font-family: "SF Mono", "Consolas", "Liberation Mono", monospace; }

a { color: var(--link); text-decoration: none; }
a:hover { color: var(--link-hover); text-decoration: underline; }

.app { display: flex; height: 100vh; }

/* Sidebar */
.sidebar {
    width: 260px;
    border-right: 1px solid var(--border);
    overflow-y: auto;
    padding: 0.75rem;
    font-size: 0.9rem;
}
.sidebar h3 { font-size: 0.75rem; text-transform: uppercase; color: var(--muted); margin: 1rem 0 0.25rem; }
.sidebar ul { list-style: none; padding-left: 0.75rem; }
.sidebar > ul { padding-left: 0; }
.sidebar li { margin: 0.1rem 0; }
.sidebar .note-link.active { font-weight: 600; color: var(--orange); }
.sidebar .folder-name { color: var(--base01); font-weight: 500; }
.sidebar .actions { visibility: hidden; font-size: 0.75rem; }
.sidebar li:hover > .actions, .sidebar li:hover > span > .actions { visibility: visible; }
.sidebar .actions button { background: none; border: none; color: var(--link); cursor: pointer; font-size: 0.75rem; }
.sidebar .clipboard { font-size: 0.75rem; color: var(--muted); }
.search-box input {
    width: 100%;
    padding: 0.3rem 0.5rem;
    border: 1px solid var(--border);
    border-radius: 3px;
    background: white;
}
.tag { display: inline-block; background: var(--accent); border-radius: 3px; padding: 0 0.4rem; margin: 0.1rem; font-size: 0.8rem; }
.tag-group .count { font-size: 0.75rem; color: var(--muted); }
.tag-group ul { padding-left: 1rem; }

/* Main column */
.main { flex: 1; display: flex; flex-direction: column; overflow: hidden; }
.toolbar {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    padding: 0.4rem 0.75rem;
    border-bottom: 1px solid var(--border);
}
.toolbar .title { flex: 1; font-weight: 500; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.btn {
    background: var(--blue);
    color: var(--base3);
    border: none;
    padding: 0.25rem 0.75rem;
    border-radius: 3px;
    cursor: pointer;
    font-size: 0.8rem;
}
.btn:hover { background: var(--cyan); text-decoration: none; color: var(--base3); }
.btn.secondary { background: var(--base2); color: var(--fg); }
.btn:disabled { opacity: 0.5; cursor: default; }

.tab-bar { display: flex; border-bottom: 1px solid var(--border); overflow-x: auto; }
.tab {
    display: flex;
    align-items: center;
    gap: 0.3rem;
    padding: 0.3rem 0.75rem;
    border-right: 1px solid var(--border);
    font-size: 0.85rem;
    white-space: nowrap;
}
.tab.active { background: var(--accent); }
.tab .dirty { color: var(--orange); }
.tab button { background: none; border: none; cursor: pointer; color: var(--muted); }

.workspace { flex: 1; display: flex; overflow: hidden; }
.editor, .preview { flex: 1; overflow: auto; padding: 1rem 1.5rem; }
.editor input.title-input {
    width: 100%;
    font-size: 1.3rem;
    border: none;
    background: transparent;
    color: var(--base01);
    margin-bottom: 0.5rem;
}
.editor textarea {
    width: 100%;
    height: calc(100% - 3rem);
    border: none;
    resize: none;
    background: transparent;
    color: var(--fg);
    font-family: "SF Mono", "Consolas", "Liberation Mono", monospace;
    font-size: inherit;
    outline: none;
}
.preview h1, .preview h2, .preview h3 { margin: 1em 0 0.4em; }
.preview pre { background: var(--code-bg); padding: 0.75rem; border-radius: 3px; overflow-x: auto; }
.preview code { background: var(--code-bg); padding: 0.1rem 0.3rem; border-radius: 2px; }
.preview ul, .preview ol { padding-left: 1.5rem; }

/* Assistant */
.assistant {
    width: 33%;
    border-left: 1px solid var(--border);
    display: flex;
    flex-direction: column;
}
.assistant .messages { flex: 1; overflow-y: auto; padding: 0.75rem; }
.assistant .message { padding: 0.5rem; border-radius: 4px; margin-bottom: 0.5rem; white-space: pre-wrap; }
.assistant .message.user { background: var(--accent); }
.assistant .message.assistant { background: #eef4f8; }
.assistant form { display: flex; gap: 0.3rem; padding: 0.5rem; border-top: 1px solid var(--border); }
.assistant form input { flex: 1; padding: 0.3rem; border: 1px solid var(--border); }
.assistant .tools { display: flex; flex-wrap: wrap; gap: 0.3rem; padding: 0.5rem; border-top: 1px solid var(--border); }

/* Dialogs */
.dialog-overlay {
    display: none;
    position: fixed;
    inset: 0;
    background: rgba(0, 43, 54, 0.4);
    align-items: center;
    justify-content: center;
}
.dialog-overlay.active { display: flex; }
.dialog { background: var(--bg); padding: 1.25rem; border-radius: 4px; min-width: 320px; }
.dialog h2 { font-size: 1.1rem; margin-bottom: 0.5rem; }
.dialog .row { display: flex; gap: 0.5rem; justify-content: flex-end; margin-top: 1rem; }
.dialog select { width: 100%; padding: 0.3rem; }

.empty-state { margin: auto; text-align: center; }
.empty-state h2 { margin-bottom: 1rem; }
"#;
